//! # Delver - Deep Research Orchestration Server
//!
//! Turns a user's topic into a verified research brief, fans delegated
//! sub-topics out to parallel researchers backed by web search, compresses
//! their findings, and synthesizes a final report - pausing mid-flow for
//! clarifying questions and resuming sessions later.
//!
//! ## Overview
//!
//! Delver can be used two ways:
//!
//! 1. **As a standalone server** - run the `delver-server` binary
//! 2. **As a library** - embed the engine in your own host application
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use delver::{
//!     DeepResearchFlow, FlowLimits, GeminiClient, ModelGateway, ResearchService,
//!     SearchAggregator, SessionStore, TavilyClient,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), delver::AppError> {
//! let gateway = Arc::new(ModelGateway::new(Arc::new(GeminiClient::new(
//!     "api-key".into(),
//!     "gemini-2.0-flash".into(),
//! ))));
//! gateway.verify().await?;
//!
//! let aggregator = Arc::new(SearchAggregator::new(
//!     gateway.clone(),
//!     Arc::new(TavilyClient::new("tavily-key".into())),
//! ));
//! let flow = DeepResearchFlow::new(gateway, aggregator, FlowLimits::default());
//! let store = Arc::new(SessionStore::open("data/delver.db").await?);
//! let service = ResearchService::new(flow, store);
//!
//! let session = service.start_session("History of the fall of Rome").await?;
//! println!("{}", session.status.as_str());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`llm`] - model clients and the retrying gateway
//! - [`search`] - search provider and the deduplicating aggregator
//! - [`tools`] - the closed tool set callable by the flows
//! - [`flows`] - the top-level / supervisor / researcher state machines
//! - [`service`] - session lifecycle over the engine
//! - [`db`] - libsql session store
//! - [`api`] - axum handlers and routes
//! - [`types`] - common types and error handling

/// HTTP API handlers and routes.
pub mod api;
/// Session persistence.
pub mod db;
/// Orchestration state machines.
pub mod flows;
/// Model clients and the retrying gateway.
pub mod llm;
/// Prompt templates.
pub mod prompts;
/// Web search provider and aggregator.
pub mod search;
/// Session lifecycle service.
pub mod service;
/// The closed tool set.
pub mod tools;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use db::{SessionRecord, SessionStore};
pub use flows::{DeepResearchFlow, FlowLimits, ResearcherFlow, RunOutcome, SupervisorFlow};
pub use llm::{ChatModel, GeminiClient, ModelGateway, ModelReply, RetryPolicy};
pub use search::{SearchAggregator, SearchProvider, TavilyClient};
pub use service::ResearchService;
pub use types::{AppError, Result, SessionStatus};
pub use utils::config::Config;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle service wrapping the orchestration engine
    pub service: Arc<ResearchService>,
}
