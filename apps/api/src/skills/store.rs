use serde::Deserialize;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::db::order_by;
use crate::errors::AppError;
use crate::list_field;
use crate::models::skill::{DailyUpdate, SkillLearning, SkillLearningRow};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillSortKey {
    #[default]
    SkillName,
    StartDate,
    TargetDate,
    Progress,
}

impl SkillSortKey {
    fn column(self) -> &'static str {
        match self {
            SkillSortKey::SkillName => "skill_name",
            SkillSortKey::StartDate => "start_date",
            SkillSortKey::TargetDate => "target_date",
            SkillSortKey::Progress => "progress",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillListQuery {
    #[serde(default)]
    pub sort: SkillSortKey,
    #[serde(default = "default_ascending")]
    pub ascending: bool,
    /// Only skills still in progress, soonest target first. Overrides `sort`.
    #[serde(default)]
    pub active: bool,
    /// Case-insensitive substring match on the skill name.
    pub search: Option<String>,
}

fn default_ascending() -> bool {
    true
}

impl Default for SkillListQuery {
    fn default() -> Self {
        SkillListQuery {
            sort: SkillSortKey::default(),
            ascending: default_ascending(),
            active: false,
            search: None,
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Skill {id} not found"))
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    executor: E,
    skill: &SkillLearning,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO skill_learnings
            (id, skill_name, start_date, target_date, progress, resources, color, daily_updates, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(skill.id)
    .bind(&skill.skill_name)
    .bind(skill.start_date)
    .bind(skill.target_date)
    .bind(skill.progress)
    .bind(list_field::encode_stored(&skill.resources))
    .bind(&skill.color)
    .bind(encode_updates(&skill.daily_updates))
    .bind(skill.created_at)
    .execute(executor)
    .await?;

    info!("Created skill {} ({})", skill.id, skill.skill_name);
    Ok(())
}

fn encode_updates(updates: &[DailyUpdate]) -> String {
    serde_json::to_string(updates).unwrap_or_else(|_| "[]".to_string())
}

pub async fn list(pool: &SqlitePool, query: &SkillListQuery) -> Result<Vec<SkillLearning>, AppError> {
    let sql = if query.active {
        "SELECT * FROM skill_learnings WHERE progress < 1.0 \
         ORDER BY target_date ASC, skill_name ASC, created_at ASC"
            .to_string()
    } else {
        format!(
            "SELECT * FROM skill_learnings {}",
            order_by(query.sort.column(), query.ascending)
        )
    };

    let rows = sqlx::query_as::<_, SkillLearningRow>(&sql)
        .fetch_all(pool)
        .await?;
    let mut skills: Vec<SkillLearning> = rows.into_iter().map(SkillLearning::from).collect();

    if let Some(needle) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let needle = needle.to_lowercase();
        skills.retain(|s| s.skill_name.to_lowercase().contains(&needle));
    }
    Ok(skills)
}

async fn fetch<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<SkillLearning>, AppError> {
    let row: Option<SkillLearningRow> = sqlx::query_as("SELECT * FROM skill_learnings WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(SkillLearning::from))
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<SkillLearning, AppError> {
    fetch(pool, id).await?.ok_or_else(|| not_found(id))
}

async fn write<'e, E: SqliteExecutor<'e>>(executor: E, skill: &SkillLearning) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE skill_learnings
        SET skill_name = ?, start_date = ?, target_date = ?, progress = ?,
            resources = ?, color = ?, daily_updates = ?
        WHERE id = ?
        "#,
    )
    .bind(&skill.skill_name)
    .bind(skill.start_date)
    .bind(skill.target_date)
    .bind(skill.progress)
    .bind(list_field::encode_stored(&skill.resources))
    .bind(&skill.color)
    .bind(encode_updates(&skill.daily_updates))
    .bind(skill.id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(skill.id));
    }
    Ok(())
}

/// Re-reads the record, applies `change`, and writes it back in one transaction.
/// Nothing is written when `change` fails. Date ordering is not checked here.
pub async fn update<F>(
    pool: &SqlitePool,
    id: Uuid,
    change: F,
) -> Result<SkillLearning, AppError>
where
    F: FnOnce(&mut SkillLearning) -> Result<(), AppError>,
{
    let mut tx = pool.begin().await?;
    let mut skill = fetch(&mut *tx, id).await?.ok_or_else(|| not_found(id))?;
    change(&mut skill)?;
    write(&mut *tx, &skill).await?;
    tx.commit().await?;

    info!("Updated skill {id}");
    Ok(skill)
}

/// `progress` must already be clamped by the caller.
pub async fn set_progress(pool: &SqlitePool, id: Uuid, progress: f64) -> Result<SkillLearning, AppError> {
    update(pool, id, |skill| {
        skill.progress = progress;
        Ok(())
    })
    .await
}

pub async fn set_color(pool: &SqlitePool, id: Uuid, color: String) -> Result<SkillLearning, AppError> {
    update(pool, id, |skill| {
        skill.color = color;
        Ok(())
    })
    .await
}

pub async fn add_resource(pool: &SqlitePool, id: Uuid, resource: &str) -> Result<SkillLearning, AppError> {
    update(pool, id, |skill| {
        list_field::add_item(&mut skill.resources, resource);
        Ok(())
    })
    .await
}

/// Removes every entry equal to `resource`. Missing entries are not an error.
pub async fn remove_resource(
    pool: &SqlitePool,
    id: Uuid,
    resource: &str,
) -> Result<SkillLearning, AppError> {
    update(pool, id, |skill| {
        list_field::remove_item(&mut skill.resources, resource);
        Ok(())
    })
    .await
}

pub async fn add_daily_update(
    pool: &SqlitePool,
    id: Uuid,
    entry: DailyUpdate,
) -> Result<SkillLearning, AppError> {
    let entry_id = entry.id;
    let skill = update(pool, id, |skill| {
        skill.daily_updates.push(entry);
        Ok(())
    })
    .await?;
    info!("Logged update {entry_id} on skill {id}");
    Ok(skill)
}

pub async fn remove_daily_update(
    pool: &SqlitePool,
    id: Uuid,
    update_id: Uuid,
) -> Result<SkillLearning, AppError> {
    update(pool, id, |skill| {
        let before = skill.daily_updates.len();
        skill.daily_updates.retain(|u| u.id != update_id);
        if skill.daily_updates.len() == before {
            return Err(AppError::NotFound(format!(
                "Update {update_id} not found on skill {id}"
            )));
        }
        Ok(())
    })
    .await
}

pub async fn delete_many(pool: &SqlitePool, ids: &[Uuid]) -> Result<u64, AppError> {
    let mut tx = pool.begin().await?;
    let mut deleted = 0;
    for id in ids {
        deleted += sqlx::query("DELETE FROM skill_learnings WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;

    info!("Deleted {deleted} skill(s)");
    Ok(deleted)
}

pub async fn delete_all<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<u64, AppError> {
    let deleted = sqlx::query("DELETE FROM skill_learnings")
        .execute(executor)
        .await?
        .rows_affected();
    info!("Deleted all {deleted} skill(s)");
    Ok(deleted)
}
