//! Search aggregation: batch queries, dedup by URL, summarize, format.

use crate::llm::ModelGateway;
use crate::prompts;
use crate::search::SearchProvider;
use crate::types::{Message, Result, SearchTopic, WebSummary};
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;

/// Issues a batch of search queries and turns the unique results into one
/// formatted digest with a model-written summary per source.
pub struct SearchAggregator {
    gateway: Arc<ModelGateway>,
    provider: Arc<dyn SearchProvider>,
}

struct UniqueResult {
    url: String,
    title: String,
    raw_content: String,
}

impl SearchAggregator {
    pub fn new(gateway: Arc<ModelGateway>, provider: Arc<dyn SearchProvider>) -> Self {
        Self { gateway, provider }
    }

    /// Run all queries, deduplicate across their results by URL (first
    /// occurrence wins, results without content are dropped), summarize each
    /// unique page concurrently, and format the digest.
    pub async fn digest(
        &self,
        queries: &[String],
        max_results: usize,
        topic: SearchTopic,
    ) -> Result<String> {
        let batches = try_join_all(
            queries
                .iter()
                .map(|query| self.provider.search(query, max_results, topic)),
        )
        .await?;

        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for result in batches.into_iter().flatten() {
            let raw_content = match result.raw_content {
                Some(content) if !content.is_empty() => content,
                _ => continue,
            };
            if seen.insert(result.url.clone()) {
                unique.push(UniqueResult {
                    url: result.url,
                    title: result.title,
                    raw_content,
                });
            }
        }

        tracing::debug!(
            queries = queries.len(),
            unique_sources = unique.len(),
            "summarizing search results"
        );

        let summaries = try_join_all(
            unique
                .iter()
                .map(|result| self.summarize(&result.raw_content)),
        )
        .await?;

        let mut digest = String::from("Search results:");
        for (i, (result, summary)) in unique.iter().zip(summaries).enumerate() {
            digest.push_str(&format!(
                "\n\nSOURCE {}: {}\nURL: {}\nSUMMARY:\n\n{}\n\n{}",
                i + 1,
                result.title,
                result.url,
                summary,
                "-".repeat(100)
            ));
        }
        Ok(digest)
    }

    async fn summarize(&self, webpage_content: &str) -> Result<String> {
        let prompt = prompts::summarize_webpage_prompt(
            webpage_content,
            &chrono::Utc::now().to_rfc3339(),
        );
        let reply: WebSummary = self
            .gateway
            .complete_structured(&[Message::user(prompt)])
            .await?;
        Ok(format!(
            "<summary>\n{}\n</summary>\n\n<key_excerpts>\n{}\n</key_excerpts>",
            reply.summary, reply.key_excerpts
        ))
    }
}
