//! Researcher flow: one delegated sub-topic, a bounded tool loop, then
//! compression.
//!
//! States: `Working` (tool-augmented model call; executing requested tools
//! keeps the flow in `Working`, a reply without tool calls moves it on) →
//! `Compressing` (one model call over the full transcript) → `Done`
//! (returning the digest plus the raw transcript contents).

use crate::flows::{now_iso, FlowLimits};
use crate::llm::ModelGateway;
use crate::prompts;
use crate::search::SearchAggregator;
use crate::tools::{self, ToolRequest};
use crate::types::{AppError, Message, Result, ToolCall};
use std::sync::Arc;

pub struct ResearcherFlow {
    gateway: Arc<ModelGateway>,
    aggregator: Arc<SearchAggregator>,
    limits: FlowLimits,
}

/// What a finished researcher hands back to the supervisor.
#[derive(Debug, Clone)]
pub struct ResearchOutput {
    /// Condensed digest of the whole research transcript
    pub compressed_research: String,
    /// Every transcript entry's content, kept for traceability
    pub raw_notes: Vec<String>,
}

impl ResearcherFlow {
    pub fn new(
        gateway: Arc<ModelGateway>,
        aggregator: Arc<SearchAggregator>,
        limits: FlowLimits,
    ) -> Self {
        Self {
            gateway,
            aggregator,
            limits,
        }
    }

    /// Run the flow to completion for one sub-topic.
    pub async fn run(&self, research_topic: &str) -> Result<ResearchOutput> {
        let mut transcript = vec![Message::user(research_topic)];

        // Working: loop until the model stops calling tools or the ceiling
        // forces compression.
        let mut iterations = 0;
        loop {
            if iterations >= self.limits.researcher_max_iterations {
                tracing::warn!(
                    iterations,
                    "researcher iteration ceiling reached, compressing"
                );
                break;
            }
            iterations += 1;

            let mut messages = vec![Message::system(prompts::researcher_prompt(&now_iso()))];
            messages.extend(transcript.iter().cloned());
            let reply = self
                .gateway
                .complete_with_tools(&messages, &tools::researcher_tools())
                .await?;

            if reply.tool_calls.is_empty() {
                transcript.push(Message::assistant(reply.content));
                break;
            }

            transcript.push(Message::assistant_with_tool_calls(
                reply.content,
                reply.tool_calls.clone(),
            ));
            for call in &reply.tool_calls {
                let result = self.execute_tool(call).await?;
                transcript.push(Message::tool(&call.name, &call.id, result));
            }
        }

        // Compressing.
        let mut messages = vec![Message::system(prompts::compress_prompt(&now_iso()))];
        messages.extend(transcript.iter().cloned());
        let compressed_research = self.gateway.complete(&messages).await?;

        let raw_notes = transcript
            .iter()
            .filter(|m| !m.content.is_empty())
            .map(|m| m.content.clone())
            .collect();

        Ok(ResearchOutput {
            compressed_research,
            raw_notes,
        })
    }

    async fn execute_tool(&self, call: &ToolCall) -> Result<String> {
        match ToolRequest::parse(call)? {
            ToolRequest::WebSearch {
                queries,
                max_results,
                topic,
            } => {
                self.aggregator
                    .digest(
                        &queries,
                        max_results.unwrap_or(self.limits.search_max_results),
                        topic.unwrap_or_default(),
                    )
                    .await
            }
            ToolRequest::Reflect { reflection } => Ok(tools::run_reflect(&reflection)),
            ToolRequest::DelegateResearch { .. } => Err(AppError::InvalidInput(
                "delegate_research is not available to researchers".to_string(),
            )),
        }
    }
}
