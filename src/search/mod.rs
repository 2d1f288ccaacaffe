//! Web search: the provider boundary and the digest aggregator.

pub mod aggregator;
pub mod tavily;

use crate::types::{Result, SearchResult, SearchTopic};
use async_trait::async_trait;

pub use aggregator::SearchAggregator;
pub use tavily::TavilyClient;

/// Opaque web-search capability.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        topic: SearchTopic,
    ) -> Result<Vec<SearchResult>>;
}
