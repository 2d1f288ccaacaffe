//! Shared fakes for integration tests.
//!
//! `ScriptedModel` plays every model role in the orchestration (clarifier,
//! brief writer, supervisor, researcher, summarizer, compressor, report
//! writer) with deterministic canned behavior, so whole flows can be driven
//! without a live provider. `StubSearch` and `FailingSearch` stand in for the
//! web search provider.

#![allow(dead_code)]

use async_trait::async_trait;
use delver::llm::{ChatModel, ModelReply};
use delver::search::{SearchAggregator, SearchProvider};
use delver::types::{
    AppError, Clarification, Message, MessageRole, Result, SearchResult, SearchTopic, ToolCall,
    ToolDefinition, WebSummary,
};
use delver::{DeepResearchFlow, FlowLimits, ModelGateway, ResearchService, SessionStore};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fake chat model that recognizes which orchestration step is calling it
/// from the bound tool set and the prompt, and replies with canned content.
///
/// The supervisor is given one batch of delegations (the configured topics)
/// on its first step and finishes on the next; each researcher runs exactly
/// one web search before reporting its findings.
pub struct ScriptedModel {
    clarifications: Mutex<VecDeque<Clarification>>,
    delegate_topics: Vec<String>,
    include_reflection: bool,
    compress_delays_ms: HashMap<String, u64>,
}

impl ScriptedModel {
    pub fn new(delegate_topics: &[&str]) -> Self {
        Self {
            clarifications: Mutex::new(VecDeque::new()),
            delegate_topics: delegate_topics.iter().map(|t| t.to_string()).collect(),
            include_reflection: false,
            compress_delays_ms: HashMap::new(),
        }
    }

    /// Queue a clarification round: the next clarify call asks the given
    /// questions; calls after the queue drains proceed without clarification.
    pub fn ask_clarification(self, questions: &str) -> Self {
        self.clarifications
            .lock()
            .unwrap()
            .push_back(Clarification {
                needs_clarification: true,
                questions: questions.to_string(),
                verification: String::new(),
            });
        self
    }

    /// Have the supervisor record a reflection alongside its delegations.
    pub fn with_reflection(mut self) -> Self {
        self.include_reflection = true;
        self
    }

    /// Delay the compression step for one topic, to stagger completion order
    /// across concurrent researchers.
    pub fn delay_compression(mut self, topic: &str, millis: u64) -> Self {
        self.compress_delays_ms.insert(topic.to_string(), millis);
        self
    }

    fn supervisor_reply(&self, messages: &[Message]) -> ModelReply {
        let already_delegated = messages.iter().any(|m| {
            m.role == MessageRole::Tool && m.tool_name.as_deref() == Some("delegate_research")
        });
        if already_delegated {
            return ModelReply::text("Findings cover the brief; research complete.");
        }

        let mut tool_calls = Vec::new();
        if self.include_reflection {
            tool_calls.push(ToolCall {
                id: "sup-reflect-0".to_string(),
                name: "reflect".to_string(),
                arguments: json!({"reflection": "Splitting the brief into sub-topics"}),
            });
        }
        for (i, topic) in self.delegate_topics.iter().enumerate() {
            tool_calls.push(ToolCall {
                id: format!("delegate-{i}"),
                name: "delegate_research".to_string(),
                arguments: json!({"research_topic": topic}),
            });
        }
        ModelReply {
            content: String::new(),
            tool_calls,
        }
    }

    fn researcher_reply(&self, messages: &[Message]) -> ModelReply {
        let already_searched = messages.iter().any(|m| m.role == MessageRole::Tool);
        if already_searched {
            return ModelReply::text("Search complete; findings follow.");
        }
        let topic = first_user_content(messages);
        ModelReply {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "search-0".to_string(),
                name: "web_search".to_string(),
                arguments: json!({"queries": [topic]}),
            }],
        }
    }
}

fn first_user_content(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let first = &messages[0];
        if first.role == MessageRole::System
            && first.content.contains("Condense the research transcript")
        {
            let topic = first_user_content(messages);
            if let Some(delay) = self.compress_delays_ms.get(&topic) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            return Ok(format!("Digest for {topic}"));
        }
        if first.content.starts_with("Write the final research report") {
            return Ok("## Findings\nAll sub-topics are covered.".to_string());
        }
        if first.content.contains("Condense the conversation below") {
            return Ok("Research brief for the session.".to_string());
        }
        if first.content == "Hello!" {
            return Ok("Hi.".to_string());
        }
        Err(AppError::Internal(format!(
            "unscripted completion: {}",
            first.content
        )))
    }

    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply> {
        if tools.iter().any(|t| t.name == "delegate_research") {
            Ok(self.supervisor_reply(messages))
        } else {
            Ok(self.researcher_reply(messages))
        }
    }

    async fn complete_structured(
        &self,
        _messages: &[Message],
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        if schema["properties"].get("needs_clarification").is_some() {
            let decision = self.clarifications.lock().unwrap().pop_front().unwrap_or(
                Clarification {
                    needs_clarification: false,
                    questions: String::new(),
                    verification: "Understood, starting research now.".to_string(),
                },
            );
            return serde_json::to_value(decision)
                .map_err(|e| AppError::Internal(e.to_string()));
        }
        serde_json::to_value(WebSummary {
            summary: "Summary of the page.".to_string(),
            key_excerpts: "A key excerpt.".to_string(),
        })
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Search provider returning a fixed result set for every query.
pub struct StubSearch {
    results: Vec<SearchResult>,
}

impl Default for StubSearch {
    fn default() -> Self {
        Self {
            results: vec![
                SearchResult {
                    url: "https://example.com/a".to_string(),
                    title: "Source A".to_string(),
                    raw_content: Some("Content of source A.".to_string()),
                },
                SearchResult {
                    url: "https://example.com/b".to_string(),
                    title: "Source B".to_string(),
                    raw_content: Some("Content of source B.".to_string()),
                },
            ],
        }
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
        _topic: SearchTopic,
    ) -> Result<Vec<SearchResult>> {
        Ok(self.results.clone())
    }
}

/// Search provider that always fails, for abort-path tests.
pub struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
        _topic: SearchTopic,
    ) -> Result<Vec<SearchResult>> {
        Err(AppError::Search("search backend unavailable".to_string()))
    }
}

/// Wire a full flow over the given model and search provider.
pub fn build_flow(model: Arc<dyn ChatModel>, provider: Arc<dyn SearchProvider>) -> DeepResearchFlow {
    let gateway = Arc::new(ModelGateway::new(model));
    let aggregator = Arc::new(SearchAggregator::new(gateway.clone(), provider));
    DeepResearchFlow::new(gateway, aggregator, FlowLimits::default())
}

/// Wire a full service over the given model, backed by a database at `path`.
pub async fn build_service(model: Arc<dyn ChatModel>, path: &str) -> ResearchService {
    let flow = build_flow(model, Arc::new(StubSearch::default()));
    let store = Arc::new(
        SessionStore::open(path)
            .await
            .expect("failed to open test database"),
    );
    ResearchService::new(flow, store)
}
