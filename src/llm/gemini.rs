//! Gemini provider for the Google Generative Language API.
//!
//! Maps the crate's transcript model onto `generateContent` requests: system
//! messages become the system instruction, assistant messages the `model`
//! role, and tool results `functionResponse` parts. HTTP 429 is surfaced as
//! [`AppError::RateLimited`] so the gateway can back off and retry.

use crate::llm::client::{ChatModel, ModelReply};
use crate::types::{AppError, Message, MessageRole, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_api_base(DEFAULT_API_BASE.to_string(), api_key, model)
    }

    pub fn with_api_base(api_base: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
            model,
        }
    }

    async fn send(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Model(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RateLimited(format!("Gemini quota: {body}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Model(format!("Gemini HTTP {status}: {body}")));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| AppError::Model(format!("Gemini response parse error: {e}")))
    }

    fn reply_from(&self, response: GenerateResponse) -> Result<ModelReply> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Model("Gemini returned no candidates".to_string()))?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(text) = part.text {
                content.push_str(&text);
            }
            if let Some(call) = part.function_call {
                // The API carries no call id; one is minted here so tool
                // results can be correlated downstream.
                tool_calls.push(ToolCall {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: call.name,
                    arguments: call.args,
                });
            }
        }

        Ok(ModelReply {
            content,
            tool_calls,
        })
    }
}

/// Reduce a derived JSON schema to the subset `generationConfig.responseSchema`
/// accepts. Draft metadata keys like `$schema` are not fields of the API's
/// schema object, and unknown fields get the whole request rejected with
/// INVALID_ARGUMENT.
fn response_schema_for(schema: &Value) -> Value {
    let mut schema = schema.clone();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("$defs");
        object.remove("definitions");
    }
    schema
}

/// Split a transcript into the system instruction and the `contents` array.
fn build_contents(messages: &[Message]) -> (Option<Content>, Vec<Content>) {
    let mut system_text = String::new();
    let mut contents = Vec::new();

    for message in messages {
        match message.role {
            MessageRole::System => {
                if !system_text.is_empty() {
                    system_text.push_str("\n\n");
                }
                system_text.push_str(&message.content);
            }
            MessageRole::User => contents.push(Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(&message.content)],
            }),
            MessageRole::Assistant => {
                let mut parts = Vec::new();
                if !message.content.is_empty() {
                    parts.push(Part::text(&message.content));
                }
                for call in &message.tool_calls {
                    parts.push(Part {
                        text: None,
                        function_call: Some(FunctionCall {
                            name: call.name.clone(),
                            args: call.arguments.clone(),
                        }),
                        function_response: None,
                    });
                }
                if parts.is_empty() {
                    parts.push(Part::text(""));
                }
                contents.push(Content {
                    role: Some("model".to_string()),
                    parts,
                });
            }
            MessageRole::Tool => contents.push(Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: None,
                    function_call: None,
                    function_response: Some(FunctionResponse {
                        name: message.tool_name.clone().unwrap_or_else(|| "tool".to_string()),
                        response: serde_json::json!({ "result": message.content }),
                    }),
                }],
            }),
        }
    }

    let system = if system_text.is_empty() {
        None
    } else {
        Some(Content {
            role: None,
            parts: vec![Part::text(&system_text)],
        })
    };

    (system, contents)
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let (system_instruction, contents) = build_contents(messages);
        let request = GenerateRequest {
            contents,
            system_instruction,
            tools: None,
            generation_config: None,
        };
        let reply = self.reply_from(self.send(&request).await?)?;
        Ok(reply.content)
    }

    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply> {
        let (system_instruction, contents) = build_contents(messages);
        let request = GenerateRequest {
            contents,
            system_instruction,
            tools: Some(vec![ToolsDeclaration {
                function_declarations: tools
                    .iter()
                    .map(|t| FunctionDeclaration {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.parameters.clone(),
                    })
                    .collect(),
            }]),
            generation_config: None,
        };
        self.reply_from(self.send(&request).await?)
    }

    async fn complete_structured(&self, messages: &[Message], schema: &Value) -> Result<Value> {
        let (system_instruction, contents) = build_contents(messages);
        let request = GenerateRequest {
            contents,
            system_instruction,
            tools: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema_for(schema),
            }),
        };
        let reply = self.reply_from(self.send(&request).await?)?;
        serde_json::from_str(&reply.content)
            .map_err(|e| AppError::Model(format!("Gemini structured reply is not JSON: {e}")))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============= Wire Types =============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolsDeclaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl Part {
    fn text(content: &str) -> Self {
        Self {
            text: Some(content.to_string()),
            function_call: None,
            function_response: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolsDeclaration {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}
