use anyhow::Context;
use clap::Parser;
use delver::flows::{DeepResearchFlow, FlowLimits};
use delver::llm::{GeminiClient, ModelGateway, RetryPolicy};
use delver::search::{SearchAggregator, TavilyClient};
use delver::service::ResearchService;
use delver::utils::config::Config;
use delver::{AppState, SessionStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Delver - deep research orchestration server
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Bind address (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Database file path (overrides DATABASE_PATH)
    #[arg(long)]
    database_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(path) = cli.database_path {
        config.database.path = path;
    }

    let gateway = Arc::new(ModelGateway::with_retry(
        Arc::new(GeminiClient::new(
            config.agent.gemini_api_key.clone(),
            config.agent.model.clone(),
        )),
        RetryPolicy {
            max_attempts: config.agent.retry_max_attempts,
            backoff: config.agent.retry_backoff(),
        },
    ));

    // Probe the model once before serving; a broken gateway is fatal.
    gateway.verify().await.map_err(|e| anyhow::anyhow!("{e}"))?;

    let aggregator = Arc::new(SearchAggregator::new(
        gateway.clone(),
        Arc::new(TavilyClient::new(config.agent.tavily_api_key.clone())),
    ));

    let limits = FlowLimits {
        search_max_results: config.agent.search_max_results,
        researcher_max_iterations: config.agent.researcher_max_iterations,
        supervisor_max_iterations: config.agent.supervisor_max_iterations,
    };
    let flow = DeepResearchFlow::new(gateway, aggregator, limits);

    let store = Arc::new(
        SessionStore::open(&config.database.path)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?,
    );
    let service = Arc::new(ResearchService::new(flow, store));

    let app = delver::api::create_router()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState { service });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(%addr, "delver-server listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
