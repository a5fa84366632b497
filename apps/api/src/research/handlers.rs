use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{AppError, ValidationError};
use crate::models::research::{NewResearchApplication, ResearchApplication, ResearchEdit};
use crate::research::store::{self, ResearchListQuery, RECENT_LIMIT};
use crate::routes::{BatchDeleteRequest, DeleteResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/research
pub async fn handle_list_research(
    State(state): State<AppState>,
    Query(query): Query<ResearchListQuery>,
) -> Result<Json<Vec<ResearchApplication>>, AppError> {
    Ok(Json(store::list(&state.db, &query).await?))
}

/// GET /api/v1/research/recent
pub async fn handle_recent_research(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<ResearchApplication>>, AppError> {
    let limit = query.limit.unwrap_or(RECENT_LIMIT);
    Ok(Json(store::recent(&state.db, limit).await?))
}

/// POST /api/v1/research
pub async fn handle_create_research(
    State(state): State<AppState>,
    Json(form): Json<NewResearchApplication>,
) -> Result<(StatusCode, Json<ResearchApplication>), AppError> {
    let research = form.into_record(Utc::now())?;
    store::create(&state.db, &research).await?;
    Ok((StatusCode::CREATED, Json(research)))
}

/// GET /api/v1/research/:id
pub async fn handle_get_research(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResearchApplication>, AppError> {
    Ok(Json(store::get(&state.db, id).await?))
}

/// PUT /api/v1/research/:id
pub async fn handle_update_research(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<ResearchEdit>,
) -> Result<Json<ResearchApplication>, AppError> {
    Ok(Json(
        store::update(&state.db, id, |research| Ok(edit.apply_to(research)?)).await?,
    ))
}

/// DELETE /api/v1/research/:id
pub async fn handle_delete_research(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if store::delete_many(&state.db, &[id]).await? == 0 {
        return Err(AppError::NotFound(format!(
            "Research application {id} not found"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/research/batch-delete
pub async fn handle_batch_delete_research(
    State(state): State<AppState>,
    Json(req): Json<BatchDeleteRequest>,
) -> Result<Json<DeleteResponse>, AppError> {
    if req.ids.is_empty() {
        return Err(ValidationError::NoIds.into());
    }
    let deleted = store::delete_many(&state.db, &req.ids).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// DELETE /api/v1/research
pub async fn handle_delete_all_research(
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = store::delete_all(&state.db).await?;
    Ok(Json(DeleteResponse { deleted }))
}
