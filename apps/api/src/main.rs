mod analysis;
mod config;
mod db;
mod errors;
mod jobs;
mod list_field;
mod llm_client;
mod models;
mod research;
mod routes;
mod sample_data;
mod skills;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{LlmClient, Summarizer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tracker v{}", env!("CARGO_PKG_VERSION"));

    // The app cannot run without its store
    let db = create_pool(&config.database_url).await?;

    let summarizer = build_summarizer(&config);

    let app = build_router(AppState::new(db, summarizer))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Analysis is optional. A missing key or a bad endpoint disables it.
fn build_summarizer(config: &Config) -> Option<Arc<dyn Summarizer>> {
    let Some(api_key) = config.deepinfra_api_key.clone() else {
        warn!("DEEPINFRA_API_KEY is not set; analysis is disabled");
        return None;
    };

    match LlmClient::new(&config.llm_endpoint, api_key) {
        Ok(client) => {
            info!(
                "Summarization client initialized (model: {}, endpoint: {})",
                llm_client::MODEL,
                client.endpoint()
            );
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("Analysis is disabled: {e}");
            None
        }
    }
}
