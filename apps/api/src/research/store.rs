use serde::Deserialize;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::db::order_by;
use crate::errors::AppError;
use crate::models::research::{ResearchApplication, ResearchApplicationRow, ResearchStatus};

/// Number of entries the "recent" section shows.
pub const RECENT_LIMIT: i64 = 5;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResearchSortKey {
    #[default]
    ApplyDate,
    UniversityName,
    ProfessorName,
    ResearchField,
    Status,
}

impl ResearchSortKey {
    fn column(self) -> &'static str {
        match self {
            ResearchSortKey::ApplyDate => "apply_date",
            ResearchSortKey::UniversityName => "university_name",
            ResearchSortKey::ProfessorName => "professor_name",
            ResearchSortKey::ResearchField => "research_field",
            ResearchSortKey::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResearchListQuery {
    #[serde(default)]
    pub sort: ResearchSortKey,
    pub ascending: Option<bool>,
    pub status: Option<ResearchStatus>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Research application {id} not found"))
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    executor: E,
    research: &ResearchApplication,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO research_applications
            (id, university_name, professor_name, research_field, apply_date, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(research.id)
    .bind(&research.university_name)
    .bind(&research.professor_name)
    .bind(&research.research_field)
    .bind(research.apply_date)
    .bind(research.status.as_str())
    .bind(research.created_at)
    .execute(executor)
    .await?;

    info!(
        "Created research application {} at {}",
        research.id, research.university_name
    );
    Ok(())
}

pub async fn list(
    pool: &SqlitePool,
    query: &ResearchListQuery,
) -> Result<Vec<ResearchApplication>, AppError> {
    let ascending = query
        .ascending
        .unwrap_or(query.sort != ResearchSortKey::ApplyDate);
    let filter = if query.status.is_some() { "WHERE status = ?" } else { "" };
    let sql = format!(
        "SELECT * FROM research_applications {filter} {}",
        order_by(query.sort.column(), ascending)
    );

    let mut q = sqlx::query_as::<_, ResearchApplicationRow>(&sql);
    if let Some(status) = query.status {
        q = q.bind(status.as_str());
    }
    let rows = q.fetch_all(pool).await?;
    Ok(rows.into_iter().map(ResearchApplication::from).collect())
}

/// Most recently applied first, at most `limit` entries.
pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<ResearchApplication>, AppError> {
    let sql = format!(
        "SELECT * FROM research_applications {} LIMIT ?",
        order_by("apply_date", false)
    );
    let rows = sqlx::query_as::<_, ResearchApplicationRow>(&sql)
        .bind(limit.max(0))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(ResearchApplication::from).collect())
}

async fn fetch<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<ResearchApplication>, AppError> {
    let row: Option<ResearchApplicationRow> =
        sqlx::query_as("SELECT * FROM research_applications WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
    Ok(row.map(ResearchApplication::from))
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<ResearchApplication, AppError> {
    fetch(pool, id).await?.ok_or_else(|| not_found(id))
}

async fn write<'e, E: SqliteExecutor<'e>>(
    executor: E,
    research: &ResearchApplication,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE research_applications
        SET university_name = ?, professor_name = ?, research_field = ?, apply_date = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(&research.university_name)
    .bind(&research.professor_name)
    .bind(&research.research_field)
    .bind(research.apply_date)
    .bind(research.status.as_str())
    .bind(research.id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(research.id));
    }
    Ok(())
}

/// Re-reads the record, applies `change`, and writes it back in one transaction.
/// Nothing is written when `change` fails.
pub async fn update<F>(
    pool: &SqlitePool,
    id: Uuid,
    change: F,
) -> Result<ResearchApplication, AppError>
where
    F: FnOnce(&mut ResearchApplication) -> Result<(), AppError>,
{
    let mut tx = pool.begin().await?;
    let mut research = fetch(&mut *tx, id).await?.ok_or_else(|| not_found(id))?;
    change(&mut research)?;
    write(&mut *tx, &research).await?;
    tx.commit().await?;

    info!("Updated research application {id}");
    Ok(research)
}

pub async fn delete_many(pool: &SqlitePool, ids: &[Uuid]) -> Result<u64, AppError> {
    let mut tx = pool.begin().await?;
    let mut deleted = 0;
    for id in ids {
        deleted += sqlx::query("DELETE FROM research_applications WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;

    info!("Deleted {deleted} research application(s)");
    Ok(deleted)
}

pub async fn delete_all<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<u64, AppError> {
    let deleted = sqlx::query("DELETE FROM research_applications")
        .execute(executor)
        .await?
        .rows_affected();
    info!("Deleted all {deleted} research application(s)");
    Ok(deleted)
}
