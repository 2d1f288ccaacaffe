//! HTTP API tests over the full router, with scripted model and search
//! fakes behind the service.

mod common;

use axum_test::TestServer;
use common::{build_service, ScriptedModel};
use delver::api::create_router;
use delver::AppState;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

async fn test_server(model: ScriptedModel, dir: &TempDir) -> TestServer {
    let path = dir.path().join("sessions.db");
    let service = build_service(Arc::new(model), &path.to_string_lossy()).await;
    let app = create_router().with_state(AppState {
        service: Arc::new(service),
    });
    TestServer::new(app).expect("failed to create test server")
}

#[tokio::test]
async fn test_root_reports_service_info() {
    let dir = TempDir::new().unwrap();
    let server = test_server(ScriptedModel::new(&[]), &dir).await;

    let response = server.get("/").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "Delver");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_create_research_returns_completed_session() {
    let dir = TempDir::new().unwrap();
    let server = test_server(ScriptedModel::new(&["alpha"]), &dir).await;

    let response = server
        .post("/research")
        .json(&json!({"query": "compare solar and wind costs"}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "completed");
    assert!(body["final_report"].is_string());
    assert_eq!(body["messages"][0]["role"], "user");

    // The session is retrievable afterwards.
    let id = body["id"].as_str().unwrap();
    let fetched = server.get(&format!("/research/{id}")).await;
    fetched.assert_status_ok();
}

#[tokio::test]
async fn test_create_research_rejects_empty_query() {
    let dir = TempDir::new().unwrap();
    let server = test_server(ScriptedModel::new(&[]), &dir).await;

    let response = server.post("/research").json(&json!({"query": "  "})).await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_session_is_404() {
    let dir = TempDir::new().unwrap();
    let server = test_server(ScriptedModel::new(&[]), &dir).await;

    let response = server.get("/research/no-such-id").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_continue_flow_after_clarification() {
    let dir = TempDir::new().unwrap();
    let model = ScriptedModel::new(&["alpha"]).ask_clarification("Which time period?");
    let server = test_server(model, &dir).await;

    let created = server
        .post("/research")
        .json(&json!({"query": "tell me about rome"}))
        .await;
    created.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = created.json();
    assert_eq!(body["status"], "awaiting_clarification");
    let id = body["id"].as_str().unwrap().to_string();

    let resumed = server
        .post(&format!("/research/{id}/continue"))
        .json(&json!({"response": "the late empire"}))
        .await;
    resumed.assert_status_ok();
    let body: serde_json::Value = resumed.json();
    assert_eq!(body["status"], "completed");

    // A second continue hits the state guard.
    let again = server
        .post(&format!("/research/{id}/continue"))
        .json(&json!({"response": "anything else"}))
        .await;
    again.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_research_returns_all_sessions() {
    let dir = TempDir::new().unwrap();
    let server = test_server(ScriptedModel::new(&["alpha"]), &dir).await;

    for query in ["first topic", "second topic"] {
        server
            .post("/research")
            .json(&json!({"query": query}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    let response = server.get("/research").await;
    response.assert_status_ok();
    let body: Vec<serde_json::Value> = response.json();
    assert_eq!(body.len(), 2);
}
