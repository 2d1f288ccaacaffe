//! Session lifecycle on top of the orchestration engine.
//!
//! The service owns the boundary between persistent sessions and stateless
//! orchestration runs: it rebuilds the engine transcript from the persisted
//! history, runs the flow, and derives the session status from what the run
//! produced. The host must serialize concurrent resume attempts on one
//! session id; the service itself takes no lock.

use crate::db::{SessionRecord, SessionStore};
use crate::flows::{DeepResearchFlow, RunOutcome};
use crate::types::{
    AppError, HistoryEntry, Message, MessageRole, ResearchSessionResponse, Result, SessionStatus,
};
use std::sync::Arc;

pub struct ResearchService {
    flow: DeepResearchFlow,
    store: Arc<SessionStore>,
}

impl ResearchService {
    pub fn new(flow: DeepResearchFlow, store: Arc<SessionStore>) -> Self {
        Self { flow, store }
    }

    /// Create a session for a topic and run the flow until it completes or
    /// suspends awaiting clarification.
    pub async fn start_session(&self, query: &str) -> Result<ResearchSessionResponse> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Query must not be empty".to_string()));
        }

        let now = chrono::Utc::now().timestamp();
        let mut record = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            status: SessionStatus::Pending,
            messages: vec![HistoryEntry {
                role: "user".to_string(),
                content: query.to_string(),
            }],
            research_brief: None,
            final_report: None,
            created_at: now,
            updated_at: now,
        };
        self.store.create(&record).await?;
        tracing::info!(session_id = %record.id, "research session created");

        let outcome = self.flow.run(vec![Message::user(query)]).await?;
        apply_outcome(&mut record, outcome);
        self.store.update(&record).await?;

        Ok(response_from(record))
    }

    /// Resume a session that is awaiting clarification with the user's reply.
    pub async fn resume_session(
        &self,
        session_id: &str,
        reply: &str,
    ) -> Result<ResearchSessionResponse> {
        let mut record = self
            .store
            .get(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Research session {session_id} not found")))?;

        if record.status != SessionStatus::AwaitingClarification {
            return Err(AppError::InvalidState(format!(
                "Session is not awaiting clarification (current status: {})",
                record.status.as_str()
            )));
        }

        // Replay from the persisted transcript; in-memory flow state is never
        // the source of truth.
        let mut messages = transcript_from_history(&record.messages);
        messages.push(Message::user(reply));

        let outcome = self.flow.run(messages).await?;
        apply_outcome(&mut record, outcome);
        self.store.update(&record).await?;
        tracing::info!(session_id = %record.id, status = record.status.as_str(), "session resumed");

        Ok(response_from(record))
    }

    pub async fn get_session(&self, session_id: &str) -> Result<ResearchSessionResponse> {
        let record = self
            .store
            .get(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Research session {session_id} not found")))?;
        Ok(response_from(record))
    }

    /// All sessions, newest first.
    pub async fn list_sessions(&self) -> Result<Vec<ResearchSessionResponse>> {
        let records = self.store.list().await?;
        Ok(records.into_iter().map(response_from).collect())
    }
}

/// Derive the session status from what a run produced.
pub fn derive_status(research_brief: Option<&str>, final_report: Option<&str>) -> SessionStatus {
    if final_report.is_some() {
        SessionStatus::Completed
    } else if research_brief.is_some() {
        SessionStatus::InProgress
    } else {
        SessionStatus::AwaitingClarification
    }
}

/// Flatten an engine transcript into the persisted history format: user
/// messages verbatim, non-empty assistant messages verbatim, tool results as
/// tagged assistant entries. System messages and empty tool-call shells are
/// dropped.
pub fn extract_history(messages: &[Message]) -> Vec<HistoryEntry> {
    let mut history = Vec::new();
    for message in messages {
        match message.role {
            MessageRole::User => history.push(HistoryEntry {
                role: "user".to_string(),
                content: message.content.clone(),
            }),
            MessageRole::Assistant if !message.content.is_empty() => {
                history.push(HistoryEntry {
                    role: "assistant".to_string(),
                    content: message.content.clone(),
                });
            }
            MessageRole::Tool if !message.content.is_empty() => {
                let tool_name = message.tool_name.as_deref().unwrap_or("tool");
                history.push(HistoryEntry {
                    role: "assistant".to_string(),
                    content: format!("[{tool_name}]\n{}", message.content),
                });
            }
            _ => {}
        }
    }
    history
}

fn transcript_from_history(history: &[HistoryEntry]) -> Vec<Message> {
    history
        .iter()
        .map(|entry| match entry.role.as_str() {
            "user" => Message::user(&entry.content),
            _ => Message::assistant(&entry.content),
        })
        .collect()
}

fn apply_outcome(record: &mut SessionRecord, outcome: RunOutcome) {
    record.status = derive_status(
        outcome.research_brief.as_deref(),
        outcome.final_report.as_deref(),
    );
    record.messages = extract_history(&outcome.messages);
    record.research_brief = outcome.research_brief;
    record.final_report = outcome.final_report;
    record.updated_at = chrono::Utc::now().timestamp();
}

fn response_from(record: SessionRecord) -> ResearchSessionResponse {
    ResearchSessionResponse {
        id: record.id,
        status: record.status,
        messages: record.messages,
        research_brief: record.research_brief,
        final_report: record.final_report,
    }
}
