use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{AppError, ValidationError};
use crate::jobs::store::{self, JobListQuery, StatusCount};
use crate::list_field::{ListInput, Separator};
use crate::models::job::{JobApplication, JobEdit, JobStatus, NewJobApplication};
use crate::routes::{BatchDeleteRequest, DeleteResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: JobStatus,
}

#[derive(Debug, Deserialize)]
pub struct SkillsAdd {
    pub skills: ListInput,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Vec<JobApplication>>, AppError> {
    Ok(Json(store::list(&state.db, &query).await?))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(form): Json<NewJobApplication>,
) -> Result<(StatusCode, Json<JobApplication>), AppError> {
    let job = form.into_record(Utc::now())?;
    store::create(&state.db, &job).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobApplication>, AppError> {
    Ok(Json(store::get(&state.db, id).await?))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<JobEdit>,
) -> Result<Json<JobApplication>, AppError> {
    Ok(Json(
        store::update(&state.db, id, |job| Ok(edit.apply_to(job)?)).await?,
    ))
}

/// PATCH /api/v1/jobs/:id/status
pub async fn handle_update_job_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<JobApplication>, AppError> {
    Ok(Json(store::update_status(&state.db, id, req.status).await?))
}

/// POST /api/v1/jobs/:id/skills
pub async fn handle_add_job_skills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SkillsAdd>,
) -> Result<Json<JobApplication>, AppError> {
    let skills = req.skills.into_items(Separator::Comma);
    Ok(Json(store::add_skills(&state.db, id, &skills).await?))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if store::delete_many(&state.db, &[id]).await? == 0 {
        return Err(AppError::NotFound(format!("Job application {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/jobs/batch-delete
pub async fn handle_batch_delete_jobs(
    State(state): State<AppState>,
    Json(req): Json<BatchDeleteRequest>,
) -> Result<Json<DeleteResponse>, AppError> {
    if req.ids.is_empty() {
        return Err(ValidationError::NoIds.into());
    }
    let deleted = store::delete_many(&state.db, &req.ids).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// DELETE /api/v1/jobs
pub async fn handle_delete_all_jobs(
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = store::delete_all(&state.db).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// GET /api/v1/jobs/stats
pub async fn handle_job_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<StatusCount>>, AppError> {
    Ok(Json(store::count_by_status(&state.db).await?))
}
