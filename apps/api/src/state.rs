use std::sync::Arc;

use sqlx::SqlitePool;

use crate::analysis::guard::AnalysisGuards;
use crate::llm_client::Summarizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// `None` when no API key is configured. Analyze routes then report that
    /// analysis is unavailable.
    pub summarizer: Option<Arc<dyn Summarizer>>,
    pub analysis: AnalysisGuards,
}

impl AppState {
    pub fn new(db: SqlitePool, summarizer: Option<Arc<dyn Summarizer>>) -> Self {
        Self {
            db,
            summarizer,
            analysis: AnalysisGuards::default(),
        }
    }
}
