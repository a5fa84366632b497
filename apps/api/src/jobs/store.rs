use serde::{Deserialize, Serialize};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::db::order_by;
use crate::errors::AppError;
use crate::list_field;
use crate::models::job::{JobApplication, JobApplicationRow, JobStatus};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobSortKey {
    #[default]
    ApplyDate,
    CompanyName,
    PositionName,
    Status,
}

impl JobSortKey {
    fn column(self) -> &'static str {
        match self {
            JobSortKey::ApplyDate => "apply_date",
            JobSortKey::CompanyName => "company_name",
            JobSortKey::PositionName => "position_name",
            JobSortKey::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    #[serde(default)]
    pub sort: JobSortKey,
    /// Defaults to newest first for dates, A-Z otherwise.
    pub ascending: Option<bool>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusCount {
    pub status: JobStatus,
    pub count: i64,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Job application {id} not found"))
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    executor: E,
    job: &JobApplication,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO job_applications
            (id, company_name, position_name, apply_date, status, required_skills, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(job.id)
    .bind(&job.company_name)
    .bind(&job.position_name)
    .bind(job.apply_date)
    .bind(job.status.as_str())
    .bind(list_field::encode_stored(&job.required_skills))
    .bind(job.created_at)
    .execute(executor)
    .await?;

    info!("Created job application {} at {}", job.id, job.company_name);
    Ok(())
}

pub async fn list(pool: &SqlitePool, query: &JobListQuery) -> Result<Vec<JobApplication>, AppError> {
    let ascending = query
        .ascending
        .unwrap_or(query.sort != JobSortKey::ApplyDate);
    let filter = if query.status.is_some() { "WHERE status = ?" } else { "" };
    let sql = format!(
        "SELECT * FROM job_applications {filter} {}",
        order_by(query.sort.column(), ascending)
    );

    let mut q = sqlx::query_as::<_, JobApplicationRow>(&sql);
    if let Some(status) = query.status {
        q = q.bind(status.as_str());
    }
    let rows = q.fetch_all(pool).await?;
    Ok(rows.into_iter().map(JobApplication::from).collect())
}

async fn fetch<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<JobApplication>, AppError> {
    let row: Option<JobApplicationRow> =
        sqlx::query_as("SELECT * FROM job_applications WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
    Ok(row.map(JobApplication::from))
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<JobApplication, AppError> {
    fetch(pool, id).await?.ok_or_else(|| not_found(id))
}

async fn write<'e, E: SqliteExecutor<'e>>(executor: E, job: &JobApplication) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE job_applications
        SET company_name = ?, position_name = ?, apply_date = ?, status = ?, required_skills = ?
        WHERE id = ?
        "#,
    )
    .bind(&job.company_name)
    .bind(&job.position_name)
    .bind(job.apply_date)
    .bind(job.status.as_str())
    .bind(list_field::encode_stored(&job.required_skills))
    .bind(job.id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(job.id));
    }
    Ok(())
}

/// Re-reads the record, applies `change`, and writes it back in one transaction.
/// Nothing is written when `change` fails.
pub async fn update<F>(
    pool: &SqlitePool,
    id: Uuid,
    change: F,
) -> Result<JobApplication, AppError>
where
    F: FnOnce(&mut JobApplication) -> Result<(), AppError>,
{
    let mut tx = pool.begin().await?;
    let mut job = fetch(&mut *tx, id).await?.ok_or_else(|| not_found(id))?;
    change(&mut job)?;
    write(&mut *tx, &job).await?;
    tx.commit().await?;

    info!("Updated job application {id}");
    Ok(job)
}

pub async fn update_status(
    pool: &SqlitePool,
    id: Uuid,
    status: JobStatus,
) -> Result<JobApplication, AppError> {
    let job = update(pool, id, |job| {
        job.status = status;
        Ok(())
    })
    .await?;

    info!("Job application {id} moved to {status}");
    Ok(job)
}

/// Appends skills to the stored list.
pub async fn add_skills(
    pool: &SqlitePool,
    id: Uuid,
    skills: &[String],
) -> Result<JobApplication, AppError> {
    update(pool, id, |job| {
        for skill in skills {
            list_field::add_item(&mut job.required_skills, skill);
        }
        Ok(())
    })
    .await
}

pub async fn delete_many(pool: &SqlitePool, ids: &[Uuid]) -> Result<u64, AppError> {
    let mut tx = pool.begin().await?;
    let mut deleted = 0;
    for id in ids {
        deleted += sqlx::query("DELETE FROM job_applications WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;

    info!("Deleted {deleted} job application(s)");
    Ok(deleted)
}

pub async fn delete_all<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<u64, AppError> {
    let deleted = sqlx::query("DELETE FROM job_applications")
        .execute(executor)
        .await?
        .rows_affected();
    info!("Deleted all {deleted} job application(s)");
    Ok(deleted)
}

/// Counts per status, every status included. Unrecognised stored values count as Applied.
pub async fn count_by_status(pool: &SqlitePool) -> Result<Vec<StatusCount>, AppError> {
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM job_applications GROUP BY status")
            .fetch_all(pool)
            .await?;

    let mut counts: Vec<StatusCount> = JobStatus::ALL
        .into_iter()
        .map(|status| StatusCount { status, count: 0 })
        .collect();
    for (raw, count) in rows {
        let status = raw.parse().unwrap_or(JobStatus::Applied);
        if let Some(entry) = counts.iter_mut().find(|c| c.status == status) {
            entry.count += count;
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::db::test_pool;
    use crate::list_field::ListInput;
    use crate::errors::ValidationError;
    use crate::models::job::{JobEdit, NewJobApplication};

    fn new_job(company: &str, status: JobStatus, days_ago: i64) -> JobApplication {
        NewJobApplication {
            company_name: company.into(),
            position_name: "Engineer".into(),
            apply_date: Some(Utc::now() - Duration::days(days_ago)),
            status,
            required_skills: ListInput::Items(vec!["Rust".into(), "SQL, advanced".into()]),
        }
        .into_record(Utc::now())
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_list_returns_record_intact() {
        let pool = test_pool().await;
        let job = new_job("Apple", JobStatus::Interview, 0);
        create(&pool, &job).await.unwrap();

        let listed = list(&pool, &JobListQuery::default()).await.unwrap();
        assert_eq!(listed, vec![job]);
    }

    #[tokio::test]
    async fn test_list_defaults_to_newest_first() {
        let pool = test_pool().await;
        for (company, days_ago) in [("Old", 5), ("New", 1), ("Mid", 3)] {
            create(&pool, &new_job(company, JobStatus::Applied, days_ago))
                .await
                .unwrap();
        }

        let names: Vec<_> = list(&pool, &JobListQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.company_name)
            .collect();
        assert_eq!(names, vec!["New", "Mid", "Old"]);

        let query = JobListQuery {
            sort: JobSortKey::CompanyName,
            ..Default::default()
        };
        let names: Vec<_> = list(&pool, &query)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.company_name)
            .collect();
        assert_eq!(names, vec!["Mid", "New", "Old"]);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let pool = test_pool().await;
        create(&pool, &new_job("A", JobStatus::Offer, 1)).await.unwrap();
        create(&pool, &new_job("B", JobStatus::Rejected, 2)).await.unwrap();

        let query = JobListQuery {
            status: Some(JobStatus::Offer),
            ..Default::default()
        };
        let listed = list(&pool, &query).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].company_name, "A");
    }

    #[tokio::test]
    async fn test_delete_removes_only_target() {
        let pool = test_pool().await;
        let keep = new_job("Keep", JobStatus::Applied, 1);
        let drop = new_job("Drop", JobStatus::Applied, 2);
        create(&pool, &keep).await.unwrap();
        create(&pool, &drop).await.unwrap();

        assert_eq!(delete_many(&pool, &[drop.id]).await.unwrap(), 1);
        let listed = list(&pool, &JobListQuery::default()).await.unwrap();
        assert_eq!(listed, vec![keep]);
        assert!(matches!(get(&pool, drop.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_persists_mutation() {
        let pool = test_pool().await;
        let mut job = new_job("Tesla", JobStatus::Applied, 1);
        create(&pool, &job).await.unwrap();

        let updated = update(&pool, job.id, |stored| {
            stored.position_name = "ML Engineer".into();
            stored.required_skills = vec!["PyTorch".into()];
            Ok(())
        })
        .await
        .unwrap();

        job.position_name = "ML Engineer".into();
        job.required_skills = vec!["PyTorch".into()];
        assert_eq!(updated, job);
        assert_eq!(get(&pool, job.id).await.unwrap(), job);
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let pool = test_pool().await;
        let job = new_job("Ghost", JobStatus::Applied, 1);
        let result = update(&pool, job.id, |_| Ok(())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_status_and_skills_mutations() {
        let pool = test_pool().await;
        let job = new_job("Google", JobStatus::Applied, 1);
        create(&pool, &job).await.unwrap();

        let moved = update_status(&pool, job.id, JobStatus::Offer).await.unwrap();
        assert_eq!(moved.status, JobStatus::Offer);

        let grown = add_skills(&pool, job.id, &["Go".into(), " ".into()])
            .await
            .unwrap();
        assert_eq!(grown.required_skills, vec!["Rust", "SQL, advanced", "Go"]);
        assert_eq!(get(&pool, job.id).await.unwrap(), grown);
    }

    #[tokio::test]
    async fn test_count_by_status_includes_zeroes() {
        let pool = test_pool().await;
        create(&pool, &new_job("A", JobStatus::Applied, 1)).await.unwrap();
        create(&pool, &new_job("B", JobStatus::Applied, 2)).await.unwrap();
        create(&pool, &new_job("C", JobStatus::Offer, 3)).await.unwrap();

        let counts = count_by_status(&pool).await.unwrap();
        let pairs: Vec<_> = counts.iter().map(|c| (c.status, c.count)).collect();
        assert_eq!(
            pairs,
            vec![
                (JobStatus::Applied, 2),
                (JobStatus::Interview, 0),
                (JobStatus::Offer, 1),
                (JobStatus::Rejected, 0),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_all() {
        let pool = test_pool().await;
        create(&pool, &new_job("A", JobStatus::Applied, 1)).await.unwrap();
        create(&pool, &new_job("B", JobStatus::Applied, 2)).await.unwrap();
        assert_eq!(delete_all(&pool).await.unwrap(), 2);
        assert!(list(&pool, &JobListQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_applies_to_current_row() {
        let pool = test_pool().await;
        let job = new_job("Amazon", JobStatus::Applied, 1);
        create(&pool, &job).await.unwrap();

        add_skills(&pool, job.id, &["AWS".into()]).await.unwrap();
        update_status(&pool, job.id, JobStatus::Interview).await.unwrap();

        let edit = JobEdit {
            company_name: "Amazon".into(),
            position_name: "Data Scientist".into(),
            apply_date: None,
            status: None,
            required_skills: None,
        };
        let edited = update(&pool, job.id, |j| Ok(edit.apply_to(j)?)).await.unwrap();
        assert_eq!(edited.status, JobStatus::Interview);
        assert_eq!(edited.required_skills, vec!["Rust", "SQL, advanced", "AWS"]);
    }

    #[tokio::test]
    async fn test_rejected_edit_leaves_row_untouched() {
        let pool = test_pool().await;
        let job = new_job("Tesla", JobStatus::Offer, 1);
        create(&pool, &job).await.unwrap();

        let edit = JobEdit {
            company_name: " ".into(),
            position_name: "PM".into(),
            apply_date: None,
            status: Some(JobStatus::Rejected),
            required_skills: Some(ListInput::default()),
        };
        let result = update(&pool, job.id, |j| Ok(edit.apply_to(j)?)).await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::Required("company name")))
        ));
        assert_eq!(get(&pool, job.id).await.unwrap(), job);
    }
}
