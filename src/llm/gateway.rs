use crate::llm::client::{ChatModel, ModelReply};
use crate::types::{AppError, Message, Result, ToolDefinition};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Diagnostic attached to a failed startup probe. The two known causes are a
/// bad credential and a regional access restriction on Google AI Studio.
const INIT_DIAGNOSTIC: &str = "\
Could not reach the language model.
Make sure a valid GEMINI_API_KEY is set in the environment or .env file.
Google AI Studio is not available in every region; if access is restricted \
where this server runs, route traffic through a VPN or deploy in a supported \
region. Unstable VPN exits are a known source of long delays and failed calls.";

/// Retry behavior for rate-limited calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Fixed sleep between rate-limited attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(60),
        }
    }
}

/// Wraps the generation capability with retry/backoff on quota errors.
///
/// Stateless per invocation; a backoff sleep blocks only the calling future,
/// so concurrent sibling flows keep running.
pub struct ModelGateway {
    model: Arc<dyn ChatModel>,
    retry: RetryPolicy,
}

impl ModelGateway {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self::with_retry(model, RetryPolicy::default())
    }

    pub fn with_retry(model: Arc<dyn ChatModel>, retry: RetryPolicy) -> Self {
        Self { model, retry }
    }

    /// One-shot probe of the generation capability.
    ///
    /// Called once at startup; a failure here is fatal and carries guidance
    /// about the likely causes instead of letting the server come up broken.
    pub async fn verify(&self) -> Result<()> {
        let probe = [Message::user("Hello!")];
        match self.model.complete(&probe).await {
            Ok(_) => {
                tracing::info!(model = self.model.model_name(), "model gateway verified");
                Ok(())
            }
            Err(e) => Err(AppError::Gateway(format!("{INIT_DIAGNOSTIC}\nCause: {e}"))),
        }
    }

    /// Plain completion.
    pub async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.run_with_retry(|| self.model.complete(messages)).await
    }

    /// Tool-augmented completion.
    pub async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply> {
        self.run_with_retry(|| self.model.complete_with_tools(messages, tools))
            .await
    }

    /// Structured completion, deserialized against the schema derived from `T`.
    pub async fn complete_structured<T>(&self, messages: &[Message]) -> Result<T>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let schema = serde_json::to_value(schemars::schema_for!(T))
            .map_err(|e| AppError::Internal(format!("Failed to serialize schema: {e}")))?;
        let value = self
            .run_with_retry(|| self.model.complete_structured(messages, &schema))
            .await?;
        serde_json::from_value(value)
            .map_err(|e| AppError::Model(format!("Structured reply did not match schema: {e}")))
    }

    /// Run one external call, sleeping and retrying on rate-limit signals only.
    async fn run_with_retry<T, F, Fut>(&self, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_rate_limit() => {
                    if attempt >= self.retry.max_attempts {
                        tracing::error!(attempt, "rate limit retries exhausted");
                        return Err(e);
                    }
                    tracing::warn!(
                        attempt,
                        backoff_secs = self.retry.backoff.as_secs_f64(),
                        "rate limited, backing off before retry"
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
