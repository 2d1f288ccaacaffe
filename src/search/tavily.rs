//! Tavily search client.

use crate::search::SearchProvider;
use crate::types::{AppError, Result, SearchResult, SearchTopic};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE: &str = "https://api.tavily.com";

pub struct TavilyClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl TavilyClient {
    pub fn new(api_key: String) -> Self {
        Self::with_api_base(DEFAULT_API_BASE.to_string(), api_key)
    }

    pub fn with_api_base(api_base: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        topic: SearchTopic,
    ) -> Result<Vec<SearchResult>> {
        let request = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results,
            topic: topic.as_str(),
            include_raw_content: true,
        };

        let response = self
            .http
            .post(format!("{}/search", self.api_base))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Tavily request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!("Tavily HTTP {status}: {body}")));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Tavily response parse error: {e}")))?;

        Ok(body
            .results
            .into_iter()
            .map(|r| SearchResult {
                url: r.url,
                title: r.title,
                raw_content: r.raw_content,
            })
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    topic: &'a str,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    raw_content: Option<String>,
}
