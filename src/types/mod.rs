use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

/// Request to start a new research session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateResearchRequest {
    /// The research topic or question
    pub query: String,
}

/// Request to continue a session that is awaiting clarification.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContinueResearchRequest {
    /// The user's answer to the clarifying questions
    pub response: String,
}

/// Full session view returned by every session endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchSessionResponse {
    /// Unique session identifier
    pub id: String,
    /// Current lifecycle status
    pub status: SessionStatus,
    /// Conversation history, oldest first
    pub messages: Vec<HistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_brief: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_report: Option<String>,
}

/// One persisted conversation entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

// ============= Session Types =============

/// Lifecycle status of a research session.
///
/// `Completed` implies both the brief and the report are set;
/// `AwaitingClarification` implies neither is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    AwaitingClarification,
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::AwaitingClarification => "awaiting_clarification",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SessionStatus::Pending),
            "awaiting_clarification" => Some(SessionStatus::AwaitingClarification),
            "in_progress" => Some(SessionStatus::InProgress),
            "completed" => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}

// ============= Message Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One entry in a flow transcript.
///
/// Assistant messages may carry tool calls; tool messages carry the id and
/// name of the call they answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::Assistant, content)
    }

    /// Assistant message carrying tool calls emitted by the model.
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
            tool_name: None,
        }
    }

    /// Tool result message correlated to the call that requested it.
    pub fn tool(
        name: impl Into<String>,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: Some(tool_call_id.into()),
            tool_name: Some(name.into()),
        }
    }

    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: None,
            tool_name: None,
        }
    }
}

// ============= Tool Types =============

/// Declaration of a callable tool, bound to the model on tool-augmented calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

// ============= Structured Reply Shapes =============

/// Structured reply for the clarification step.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Clarification {
    /// Whether the user's request needs clarification before researching
    pub needs_clarification: bool,
    /// Clarifying questions to ask the user (at most three)
    pub questions: String,
    /// Short confirmation that the request is understood and research begins
    pub verification: String,
}

/// Structured reply for webpage summarization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebSummary {
    /// Condensed content of the page (paragraphs and/or bullet points)
    pub summary: String,
    /// Up to five verbatim quotes worth preserving
    pub key_excerpts: String,
}

// ============= Search Types =============

/// One raw result from the web-search provider. Scoped to a single
/// aggregator call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub raw_content: Option<String>,
}

/// Topic category forwarded to the search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    General,
    News,
    Finance,
}

impl SearchTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchTopic::General => "general",
            SearchTopic::News => "news",
            SearchTopic::Finance => "finance",
        }
    }
}

impl Default for SearchTopic {
    fn default() -> Self {
        SearchTopic::General
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Transient quota exhaustion; retried inside the model gateway.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The generation capability was unreachable at startup. Fatal.
    #[error("Model gateway initialization failed: {0}")]
    Gateway(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Classify an error as a quota/rate-limit signal.
    ///
    /// Providers that surface HTTP 429 map it to `RateLimited` directly; for
    /// errors wrapped by intermediate layers the message is inspected for the
    /// usual quota markers.
    pub fn is_rate_limit(&self) -> bool {
        if matches!(self, AppError::RateLimited(_)) {
            return true;
        }
        let text = self.to_string();
        text.contains("429")
            || text.contains("RESOURCE_EXHAUSTED")
            || text.to_lowercase().contains("quota")
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            AppError::InvalidState(msg) | AppError::InvalidInput(msg) => {
                (axum::http::StatusCode::BAD_REQUEST, msg)
            }
            AppError::RateLimited(msg) => (axum::http::StatusCode::TOO_MANY_REQUESTS, msg),
            AppError::Gateway(msg)
            | AppError::Model(msg)
            | AppError::Search(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
