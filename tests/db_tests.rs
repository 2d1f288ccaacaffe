//! Session store tests against a real on-disk database.

use delver::db::{SessionRecord, SessionStore};
use delver::types::HistoryEntry;
use delver::SessionStatus;
use tempfile::TempDir;

fn record(id: &str, created_at: i64) -> SessionRecord {
    SessionRecord {
        id: id.to_string(),
        status: SessionStatus::Pending,
        messages: vec![HistoryEntry {
            role: "user".to_string(),
            content: format!("topic for {id}"),
        }],
        research_brief: None,
        final_report: None,
        created_at,
        updated_at: created_at,
    }
}

async fn open_store(dir: &TempDir) -> SessionStore {
    let path = dir.path().join("sessions.db");
    SessionStore::open(&path.to_string_lossy())
        .await
        .expect("failed to open store")
}

#[tokio::test]
async fn test_create_and_get_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.create(&record("s1", 100)).await.unwrap();

    let fetched = store.get("s1").await.unwrap().expect("record missing");
    assert_eq!(fetched.id, "s1");
    assert_eq!(fetched.status, SessionStatus::Pending);
    assert_eq!(fetched.messages.len(), 1);
    assert_eq!(fetched.messages[0].content, "topic for s1");
    assert!(fetched.research_brief.is_none());
    assert!(fetched.final_report.is_none());
    assert_eq!(fetched.created_at, 100);
}

#[tokio::test]
async fn test_get_unknown_id_is_none() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    assert!(store.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_overwrites_run_output() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let mut rec = record("s1", 100);
    store.create(&rec).await.unwrap();

    rec.status = SessionStatus::Completed;
    rec.research_brief = Some("the brief".to_string());
    rec.final_report = Some("the report".to_string());
    rec.messages.push(HistoryEntry {
        role: "assistant".to_string(),
        content: "the report".to_string(),
    });
    rec.updated_at = 200;
    store.update(&rec).await.unwrap();

    let fetched = store.get("s1").await.unwrap().expect("record missing");
    assert_eq!(fetched.status, SessionStatus::Completed);
    assert_eq!(fetched.research_brief.as_deref(), Some("the brief"));
    assert_eq!(fetched.final_report.as_deref(), Some("the report"));
    assert_eq!(fetched.messages.len(), 2);
    assert_eq!(fetched.updated_at, 200);
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.create(&record("old", 100)).await.unwrap();
    store.create(&record("new", 300)).await.unwrap();
    store.create(&record("mid", 200)).await.unwrap();

    let listed = store.list().await.unwrap();
    let ids: Vec<_> = listed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn test_reopen_preserves_rows() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir).await;
        store.create(&record("s1", 100)).await.unwrap();
    }

    let store = open_store(&dir).await;
    assert!(store.get("s1").await.unwrap().is_some());
}
