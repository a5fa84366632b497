pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::handlers as analysis;
use crate::jobs::handlers as jobs;
use crate::research::handlers as research;
use crate::sample_data;
use crate::skills::handlers as skills;
use crate::state::AppState;

/// Body of the `batch-delete` routes: the ids selected in a list view.
#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job applications
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs)
                .post(jobs::handle_create_job)
                .delete(jobs::handle_delete_all_jobs),
        )
        .route("/api/v1/jobs/stats", get(jobs::handle_job_stats))
        .route("/api/v1/jobs/batch-delete", post(jobs::handle_batch_delete_jobs))
        .route("/api/v1/jobs/analyze", post(analysis::handle_analyze_jobs))
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route("/api/v1/jobs/:id/status", patch(jobs::handle_update_job_status))
        .route("/api/v1/jobs/:id/skills", post(jobs::handle_add_job_skills))
        // Research applications
        .route(
            "/api/v1/research",
            get(research::handle_list_research)
                .post(research::handle_create_research)
                .delete(research::handle_delete_all_research),
        )
        .route("/api/v1/research/recent", get(research::handle_recent_research))
        .route(
            "/api/v1/research/batch-delete",
            post(research::handle_batch_delete_research),
        )
        .route(
            "/api/v1/research/analyze",
            post(analysis::handle_analyze_research),
        )
        .route(
            "/api/v1/research/:id",
            get(research::handle_get_research)
                .put(research::handle_update_research)
                .delete(research::handle_delete_research),
        )
        // Skill learning
        .route(
            "/api/v1/skills",
            get(skills::handle_list_skills)
                .post(skills::handle_create_skill)
                .delete(skills::handle_delete_all_skills),
        )
        .route(
            "/api/v1/skills/batch-delete",
            post(skills::handle_batch_delete_skills),
        )
        .route("/api/v1/skills/analyze", post(analysis::handle_analyze_skills))
        .route(
            "/api/v1/skills/:id",
            get(skills::handle_get_skill)
                .put(skills::handle_update_skill)
                .delete(skills::handle_delete_skill),
        )
        .route("/api/v1/skills/:id/progress", patch(skills::handle_set_progress))
        .route("/api/v1/skills/:id/color", patch(skills::handle_set_color))
        .route(
            "/api/v1/skills/:id/resources",
            post(skills::handle_add_resource).delete(skills::handle_remove_resource),
        )
        .route(
            "/api/v1/skills/:id/updates",
            post(skills::handle_add_daily_update),
        )
        .route(
            "/api/v1/skills/:id/updates/:update_id",
            delete(skills::handle_remove_daily_update),
        )
        .route("/api/v1/sample-data", post(sample_data::handle_seed_sample_data))
        .with_state(state)
}
