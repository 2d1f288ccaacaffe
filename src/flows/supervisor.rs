//! Supervisor flow: the coordination loop that plans and delegates research.
//!
//! States: `Coordinating` (tool-augmented call with reflect and
//! delegate_research; reflect calls run synchronously, delegate calls fan out
//! one researcher each and are joined together) → `Finished` (a reply with no
//! tool calls; the session's notes are every tool-result content collected so
//! far).

use crate::flows::researcher::ResearcherFlow;
use crate::flows::{now_iso, FlowLimits};
use crate::llm::ModelGateway;
use crate::prompts;
use crate::tools::{self, ToolRequest, DELEGATE_RESEARCH, REFLECT};
use crate::types::{AppError, Message, MessageRole, Result, ToolCall};
use futures::future::try_join_all;
use std::sync::Arc;

pub struct SupervisorFlow {
    gateway: Arc<ModelGateway>,
    researcher: ResearcherFlow,
    limits: FlowLimits,
}

/// What the supervisor hands back to the top-level flow.
#[derive(Debug, Clone)]
pub struct SupervisorOutput {
    /// Compressed findings, one entry per tool result in the transcript
    pub notes: Vec<String>,
    /// Raw researcher transcripts, accumulated across all delegations
    pub raw_notes: Vec<String>,
}

impl SupervisorFlow {
    pub fn new(gateway: Arc<ModelGateway>, researcher: ResearcherFlow, limits: FlowLimits) -> Self {
        Self {
            gateway,
            researcher,
            limits,
        }
    }

    /// Run the coordination loop over a transcript seeded by the top-level
    /// flow (conversation plus research brief).
    pub async fn run(&self, seed: Vec<Message>) -> Result<SupervisorOutput> {
        let mut transcript = seed;
        let mut raw_notes = Vec::new();

        let mut iterations = 0;
        loop {
            if iterations >= self.limits.supervisor_max_iterations {
                tracing::warn!(iterations, "supervisor iteration ceiling reached, finishing");
                break;
            }
            iterations += 1;

            let mut messages = vec![Message::system(prompts::supervisor_prompt(&now_iso()))];
            messages.extend(transcript.iter().cloned());
            let reply = self
                .gateway
                .complete_with_tools(&messages, &tools::supervisor_tools())
                .await?;

            if reply.tool_calls.is_empty() {
                transcript.push(Message::assistant(reply.content));
                break;
            }

            transcript.push(Message::assistant_with_tool_calls(
                reply.content,
                reply.tool_calls.clone(),
            ));
            self.execute_step(&reply.tool_calls, &mut transcript, &mut raw_notes)
                .await?;
        }

        let notes = transcript
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .map(|m| m.content.clone())
            .collect();

        Ok(SupervisorOutput { notes, raw_notes })
    }

    /// Execute one Coordinating step's tool calls: reflections inline first,
    /// then all delegations as a fork-join. One failing delegation aborts the
    /// whole join; there is no partial merge.
    async fn execute_step(
        &self,
        tool_calls: &[ToolCall],
        transcript: &mut Vec<Message>,
        raw_notes: &mut Vec<String>,
    ) -> Result<()> {
        let mut delegations: Vec<(&ToolCall, String)> = Vec::new();

        for call in tool_calls {
            match ToolRequest::parse(call)? {
                ToolRequest::Reflect { reflection } => {
                    transcript.push(Message::tool(
                        REFLECT,
                        &call.id,
                        tools::run_reflect(&reflection),
                    ));
                }
                ToolRequest::DelegateResearch { research_topic } => {
                    delegations.push((call, research_topic));
                }
                ToolRequest::WebSearch { .. } => {
                    return Err(AppError::InvalidInput(
                        "web_search is not available to the supervisor".to_string(),
                    ));
                }
            }
        }

        if delegations.is_empty() {
            return Ok(());
        }

        tracing::info!(count = delegations.len(), "dispatching researchers");
        let outputs = try_join_all(
            delegations
                .iter()
                .map(|(_, topic)| self.researcher.run(topic)),
        )
        .await?;

        // zip restores the call <-> result correlation regardless of the
        // order the researchers completed in.
        for ((call, _), output) in delegations.iter().zip(outputs) {
            raw_notes.extend(output.raw_notes);
            transcript.push(Message::tool(
                DELEGATE_RESEARCH,
                &call.id,
                output.compressed_research,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatModel, ModelReply};
    use crate::search::{SearchAggregator, SearchProvider};
    use crate::types::{SearchResult, SearchTopic, ToolDefinition};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Researcher-side model: answers every tool-augmented call with plain
    /// findings and delays each delegation's compression by topic, so
    /// researcher completion order can be forced.
    struct CompressingModel {
        delays_ms: HashMap<String, u64>,
    }

    #[async_trait]
    impl ChatModel for CompressingModel {
        async fn complete(&self, messages: &[Message]) -> crate::types::Result<String> {
            let topic = messages
                .iter()
                .find(|m| m.role == MessageRole::User)
                .map(|m| m.content.clone())
                .unwrap_or_default();
            if let Some(delay) = self.delays_ms.get(&topic) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            Ok(format!("digest for {topic}"))
        }

        async fn complete_with_tools(
            &self,
            _messages: &[Message],
            _tools: &[ToolDefinition],
        ) -> crate::types::Result<ModelReply> {
            Ok(ModelReply::text("findings ready"))
        }

        async fn complete_structured(
            &self,
            _messages: &[Message],
            _schema: &serde_json::Value,
        ) -> crate::types::Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }

        fn model_name(&self) -> &str {
            "compressing"
        }
    }

    struct NoSearch;

    #[async_trait]
    impl SearchProvider for NoSearch {
        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
            _topic: SearchTopic,
        ) -> crate::types::Result<Vec<SearchResult>> {
            Ok(vec![])
        }
    }

    fn delegate_call(id: &str, topic: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: DELEGATE_RESEARCH.to_string(),
            arguments: serde_json::json!({ "research_topic": topic }),
        }
    }

    #[tokio::test]
    async fn test_execute_step_pairs_results_with_call_ids() {
        // alpha finishes last, gamma first; the tool messages must still
        // carry each call's own id with that call's digest.
        let model = Arc::new(CompressingModel {
            delays_ms: HashMap::from([
                ("alpha".to_string(), 60),
                ("beta".to_string(), 30),
                ("gamma".to_string(), 5),
            ]),
        });
        let gateway = Arc::new(crate::llm::ModelGateway::new(model));
        let aggregator = Arc::new(SearchAggregator::new(gateway.clone(), Arc::new(NoSearch)));
        let limits = FlowLimits::default();
        let researcher = ResearcherFlow::new(gateway.clone(), aggregator, limits);
        let flow = SupervisorFlow::new(gateway, researcher, limits);

        let calls = vec![
            delegate_call("d0", "alpha"),
            delegate_call("d1", "beta"),
            delegate_call("d2", "gamma"),
        ];
        let mut transcript = vec![Message::user("the brief")];
        let mut raw_notes = Vec::new();
        flow.execute_step(&calls, &mut transcript, &mut raw_notes)
            .await
            .unwrap();

        let results: Vec<_> = transcript
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .collect();
        assert_eq!(results.len(), 3);
        for (result, (id, topic)) in results
            .iter()
            .zip([("d0", "alpha"), ("d1", "beta"), ("d2", "gamma")])
        {
            assert_eq!(result.tool_call_id.as_deref(), Some(id));
            assert_eq!(result.tool_name.as_deref(), Some(DELEGATE_RESEARCH));
            assert_eq!(result.content, format!("digest for {topic}"));
        }
        assert!(!raw_notes.is_empty());
    }
}
