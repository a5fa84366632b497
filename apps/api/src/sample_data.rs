//! Demo records for a fresh install.

use axum::{extract::State, Json};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::AppError;
use crate::jobs::store as job_store;
use crate::list_field::ListInput;
use crate::models::job::{JobApplication, JobStatus, NewJobApplication};
use crate::models::research::{NewResearchApplication, ResearchApplication, ResearchStatus};
use crate::models::skill::{NewSkillLearning, SkillLearning};
use crate::research::store as research_store;
use crate::skills::store as skill_store;
use crate::state::AppState;

const SAMPLE_JOBS: [(&str, &str, JobStatus); 5] = [
    ("Apple", "iOS Developer", JobStatus::Applied),
    ("Google", "SWE", JobStatus::Interview),
    ("Amazon", "Data Scientist", JobStatus::Offer),
    ("Microsoft", "PM", JobStatus::Rejected),
    ("Tesla", "ML Engineer", JobStatus::Applied),
];

#[derive(Debug, Serialize, PartialEq)]
pub struct SeedSummary {
    pub jobs: usize,
    pub research: usize,
    pub skills: usize,
}

fn sample_jobs(now: DateTime<Utc>) -> Result<Vec<JobApplication>, AppError> {
    SAMPLE_JOBS
        .iter()
        .zip(1..)
        .map(|((company, position, status), days_ago)| -> Result<JobApplication, AppError> {
            let skills = if days_ago == 1 { "Swift,UIKit,CoreData" } else { "" };
            Ok(NewJobApplication {
                company_name: company.to_string(),
                position_name: position.to_string(),
                apply_date: Some(now - Duration::days(days_ago)),
                status: *status,
                required_skills: ListInput::Text(skills.to_string()),
            }
            .into_record(now)?)
        })
        .collect()
}

fn sample_research(now: DateTime<Utc>) -> Result<ResearchApplication, AppError> {
    Ok(NewResearchApplication {
        university_name: "Stanford".into(),
        professor_name: "Dr. Smith".into(),
        research_field: "Computer Science".into(),
        apply_date: Some(now),
        status: ResearchStatus::Submitted,
    }
    .into_record(now)?)
}

fn sample_skill(now: DateTime<Utc>) -> Result<SkillLearning, AppError> {
    let mut skill = NewSkillLearning::new("SwiftUI");
    skill.progress = 0.25;
    Ok(skill.into_record(now)?)
}

/// Deletes every record of every type, then inserts the demo set. All or nothing.
pub async fn reset_and_seed(pool: &SqlitePool) -> Result<SeedSummary, AppError> {
    let now = Utc::now();
    let jobs = sample_jobs(now)?;
    let research = sample_research(now)?;
    let skill = sample_skill(now)?;

    let mut tx = pool.begin().await?;
    job_store::delete_all(&mut *tx).await?;
    research_store::delete_all(&mut *tx).await?;
    skill_store::delete_all(&mut *tx).await?;

    for job in &jobs {
        job_store::create(&mut *tx, job).await?;
    }
    research_store::create(&mut *tx, &research).await?;
    skill_store::create(&mut *tx, &skill).await?;
    tx.commit().await?;

    info!("Seeded sample data");
    Ok(SeedSummary {
        jobs: jobs.len(),
        research: 1,
        skills: 1,
    })
}

/// POST /api/v1/sample-data
pub async fn handle_seed_sample_data(
    State(state): State<AppState>,
) -> Result<Json<SeedSummary>, AppError> {
    Ok(Json(reset_and_seed(&state.db).await?))
}
