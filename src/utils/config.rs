use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the local libsql database file
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub gemini_api_key: String,
    pub tavily_api_key: String,
    pub model: String,
    /// Total attempts for a gateway call hitting rate limits
    pub retry_max_attempts: u32,
    /// Fixed sleep between rate-limited attempts, in seconds
    pub retry_backoff_secs: u64,
    /// Result cap per search query
    pub search_max_results: usize,
    /// Iteration ceiling for one researcher tool loop
    pub researcher_max_iterations: usize,
    /// Iteration ceiling for the supervisor coordination loop
    pub supervisor_max_iterations: usize,
}

impl AgentConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
            },
            database: DatabaseConfig {
                path: env::var("DATABASE_PATH").unwrap_or_else(|_| "data/delver.db".to_string()),
            },
            agent: AgentConfig {
                gemini_api_key: env::var("GEMINI_API_KEY")?,
                tavily_api_key: env::var("TAVILY_API_KEY")?,
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
                retry_max_attempts: env::var("RETRY_MAX_ATTEMPTS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()?,
                retry_backoff_secs: env::var("RETRY_BACKOFF_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()?,
                search_max_results: env::var("SEARCH_MAX_RESULTS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
                researcher_max_iterations: env::var("RESEARCHER_MAX_ITERATIONS")
                    .unwrap_or_else(|_| "12".to_string())
                    .parse()?,
                supervisor_max_iterations: env::var("SUPERVISOR_MAX_ITERATIONS")
                    .unwrap_or_else(|_| "12".to_string())
                    .parse()?,
            },
        })
    }
}
