use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_ENDPOINT;

/// Application configuration loaded from environment variables.
///
/// Only the store location is needed to start. The summarization key is
/// optional: without it the analyze routes report that analysis is unavailable.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub deepinfra_api_key: Option<String>,
    pub llm_endpoint: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: env_or("DATABASE_URL", "sqlite://tracker.db"),
            bind_addr: env_or("BIND_ADDR", "127.0.0.1"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            deepinfra_api_key: optional_env("DEEPINFRA_API_KEY"),
            llm_endpoint: env_or("LLM_ENDPOINT", DEFAULT_ENDPOINT),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
