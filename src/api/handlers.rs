use crate::types::{
    ContinueResearchRequest, CreateResearchRequest, ResearchSessionResponse, Result,
};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

/// API info.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "title": "Delver",
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Start a new research session.
#[utoipa::path(
    post,
    path = "/research",
    request_body = CreateResearchRequest,
    responses(
        (status = 201, description = "Session created and run", body = ResearchSessionResponse),
        (status = 400, description = "Invalid input")
    ),
    tag = "research"
)]
pub async fn create_research(
    State(state): State<AppState>,
    Json(payload): Json<CreateResearchRequest>,
) -> Result<(StatusCode, Json<ResearchSessionResponse>)> {
    let session = state.service.start_session(&payload.query).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Fetch one research session.
#[utoipa::path(
    get,
    path = "/research/{research_id}",
    params(("research_id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session found", body = ResearchSessionResponse),
        (status = 404, description = "Unknown session id")
    ),
    tag = "research"
)]
pub async fn get_research(
    State(state): State<AppState>,
    Path(research_id): Path<String>,
) -> Result<Json<ResearchSessionResponse>> {
    Ok(Json(state.service.get_session(&research_id).await?))
}

/// Continue a session that is awaiting clarification.
#[utoipa::path(
    post,
    path = "/research/{research_id}/continue",
    params(("research_id" = String, Path, description = "Session id")),
    request_body = ContinueResearchRequest,
    responses(
        (status = 200, description = "Session resumed", body = ResearchSessionResponse),
        (status = 400, description = "Session is not awaiting clarification"),
        (status = 404, description = "Unknown session id")
    ),
    tag = "research"
)]
pub async fn continue_research(
    State(state): State<AppState>,
    Path(research_id): Path<String>,
    Json(payload): Json<ContinueResearchRequest>,
) -> Result<Json<ResearchSessionResponse>> {
    Ok(Json(
        state
            .service
            .resume_session(&research_id, &payload.response)
            .await?,
    ))
}

/// List all research sessions, newest first.
#[utoipa::path(
    get,
    path = "/research",
    responses(
        (status = 200, description = "All sessions", body = [ResearchSessionResponse])
    ),
    tag = "research"
)]
pub async fn list_research(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResearchSessionResponse>>> {
    Ok(Json(state.service.list_sessions().await?))
}
