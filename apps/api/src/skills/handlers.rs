use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{AppError, ValidationError};
use crate::models::skill::{
    clamp_progress, normalize_color, NewDailyUpdate, NewSkillLearning, SkillEdit, SkillLearning,
    SkillView,
};
use crate::routes::{BatchDeleteRequest, DeleteResponse};
use crate::skills::store::{self, SkillListQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    pub progress: f64,
}

#[derive(Debug, Deserialize)]
pub struct ColorUpdate {
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct ResourceRequest {
    pub resource: String,
}

fn view(skill: SkillLearning) -> Json<SkillView> {
    Json(SkillView::new(skill, Utc::now()))
}

/// GET /api/v1/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
    Query(query): Query<SkillListQuery>,
) -> Result<Json<Vec<SkillView>>, AppError> {
    let now = Utc::now();
    let skills = store::list(&state.db, &query).await?;
    Ok(Json(
        skills.into_iter().map(|s| SkillView::new(s, now)).collect(),
    ))
}

/// POST /api/v1/skills
pub async fn handle_create_skill(
    State(state): State<AppState>,
    Json(form): Json<NewSkillLearning>,
) -> Result<(StatusCode, Json<SkillView>), AppError> {
    let skill = form.into_record(Utc::now())?;
    store::create(&state.db, &skill).await?;
    Ok((StatusCode::CREATED, view(skill)))
}

/// GET /api/v1/skills/:id
pub async fn handle_get_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SkillView>, AppError> {
    Ok(view(store::get(&state.db, id).await?))
}

/// PUT /api/v1/skills/:id
pub async fn handle_update_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<SkillEdit>,
) -> Result<Json<SkillView>, AppError> {
    Ok(view(
        store::update(&state.db, id, |skill| Ok(edit.apply_to(skill)?)).await?,
    ))
}

/// PATCH /api/v1/skills/:id/progress
pub async fn handle_set_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProgressUpdate>,
) -> Result<Json<SkillView>, AppError> {
    let progress = clamp_progress(req.progress)?;
    Ok(view(store::set_progress(&state.db, id, progress).await?))
}

/// PATCH /api/v1/skills/:id/color
pub async fn handle_set_color(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ColorUpdate>,
) -> Result<Json<SkillView>, AppError> {
    let color = normalize_color(&req.color)?;
    Ok(view(store::set_color(&state.db, id, color).await?))
}

/// POST /api/v1/skills/:id/resources
pub async fn handle_add_resource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResourceRequest>,
) -> Result<Json<SkillView>, AppError> {
    if req.resource.trim().is_empty() {
        return Err(ValidationError::Required("resource").into());
    }
    Ok(view(store::add_resource(&state.db, id, &req.resource).await?))
}

/// DELETE /api/v1/skills/:id/resources
pub async fn handle_remove_resource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResourceRequest>,
) -> Result<Json<SkillView>, AppError> {
    Ok(view(store::remove_resource(&state.db, id, &req.resource).await?))
}

/// POST /api/v1/skills/:id/updates
pub async fn handle_add_daily_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NewDailyUpdate>,
) -> Result<(StatusCode, Json<SkillView>), AppError> {
    let update = req.into_update(Utc::now())?;
    let skill = store::add_daily_update(&state.db, id, update).await?;
    Ok((StatusCode::CREATED, view(skill)))
}

/// DELETE /api/v1/skills/:id/updates/:update_id
pub async fn handle_remove_daily_update(
    State(state): State<AppState>,
    Path((id, update_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SkillView>, AppError> {
    Ok(view(store::remove_daily_update(&state.db, id, update_id).await?))
}

/// DELETE /api/v1/skills/:id
pub async fn handle_delete_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if store::delete_many(&state.db, &[id]).await? == 0 {
        return Err(AppError::NotFound(format!("Skill {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/skills/batch-delete
pub async fn handle_batch_delete_skills(
    State(state): State<AppState>,
    Json(req): Json<BatchDeleteRequest>,
) -> Result<Json<DeleteResponse>, AppError> {
    if req.ids.is_empty() {
        return Err(ValidationError::NoIds.into());
    }
    let deleted = store::delete_many(&state.db, &req.ids).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// DELETE /api/v1/skills
pub async fn handle_delete_all_skills(
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = store::delete_all(&state.db).await?;
    Ok(Json(DeleteResponse { deleted }))
}
