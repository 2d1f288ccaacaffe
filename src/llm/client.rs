use crate::types::{Message, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;

/// Opaque generation capability.
///
/// Three call modes: plain completion, tool-augmented completion, and
/// schema-constrained structured output. All providers implement this trait;
/// the flows only ever see it through the [`super::ModelGateway`].
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a plain text completion over a transcript.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Generate with a bound tool set; the reply may request tool calls.
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply>;

    /// Generate a JSON object constrained by the given schema.
    async fn complete_structured(
        &self,
        messages: &[Message],
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value>;

    /// Model name/identifier, for logging.
    fn model_name(&self) -> &str;
}

/// Reply from a tool-augmented generation request.
#[derive(Debug, Clone)]
pub struct ModelReply {
    /// Text content of the reply, possibly empty when only tools were called
    pub content: String,
    /// Tool calls requested by the model, in emission order
    pub tool_calls: Vec<ToolCall>,
}

impl ModelReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![],
        }
    }
}
