use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::guard::{AnalysisTarget, InFlight};
use crate::analysis::prompts;
use crate::errors::AppError;
use crate::jobs::store::{self as job_store, JobListQuery};
use crate::research::store::{self as research_store, ResearchListQuery};
use crate::skills::store::{self as skill_store, SkillListQuery};
use crate::state::AppState;

/// Text for the summary panel. `succeeded` is false when the text is an
/// error message rather than a summary.
#[derive(Debug, Serialize, PartialEq)]
pub struct AnalysisResponse {
    pub summary: String,
    pub succeeded: bool,
}

fn begin(state: &AppState, target: AnalysisTarget) -> Result<InFlight, AppError> {
    state.analysis.try_begin(target).ok_or_else(|| {
        AppError::Conflict(format!(
            "An analysis of {} is already running",
            target.as_str()
        ))
    })
}

async fn summarize(state: &AppState, target: AnalysisTarget, prompt: &str) -> AnalysisResponse {
    let Some(summarizer) = &state.summarizer else {
        return AnalysisResponse {
            summary: "Analysis unavailable: no summarization API key is configured".to_string(),
            succeeded: false,
        };
    };

    match summarizer.summarize(prompt).await {
        Ok(summary) => {
            info!("Analysis of {} complete", target.as_str());
            AnalysisResponse {
                summary,
                succeeded: true,
            }
        }
        Err(e) => {
            warn!("Analysis of {} failed: {e}", target.as_str());
            AnalysisResponse {
                summary: format!("Analysis failed: {e}"),
                succeeded: false,
            }
        }
    }
}

/// POST /api/v1/jobs/analyze
pub async fn handle_analyze_jobs(
    State(state): State<AppState>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let _in_flight = begin(&state, AnalysisTarget::Jobs)?;
    let jobs = job_store::list(&state.db, &JobListQuery::default()).await?;
    let prompt = prompts::build_job_prompt(&jobs);
    Ok(Json(summarize(&state, AnalysisTarget::Jobs, &prompt).await))
}

/// POST /api/v1/research/analyze
pub async fn handle_analyze_research(
    State(state): State<AppState>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let _in_flight = begin(&state, AnalysisTarget::Research)?;
    let items = research_store::list(&state.db, &ResearchListQuery::default()).await?;
    let prompt = prompts::build_research_prompt(&items);
    Ok(Json(summarize(&state, AnalysisTarget::Research, &prompt).await))
}

/// POST /api/v1/skills/analyze
pub async fn handle_analyze_skills(
    State(state): State<AppState>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let _in_flight = begin(&state, AnalysisTarget::Skills)?;
    let skills = skill_store::list(&state.db, &SkillListQuery::default()).await?;
    let prompt = prompts::build_skill_prompt(&skills);
    Ok(Json(summarize(&state, AnalysisTarget::Skills, &prompt).await))
}
