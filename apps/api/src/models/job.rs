use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::list_field::{self, ListInput, Separator};
use crate::models::require_text;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum JobStatus {
    #[default]
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::Interview => "Interview",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown job status '{s}'"))
    }
}

/// A `job_applications` row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct JobApplicationRow {
    pub id: Uuid,
    pub company_name: String,
    pub position_name: String,
    pub apply_date: DateTime<Utc>,
    pub status: String,
    pub required_skills: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobApplication {
    pub id: Uuid,
    pub company_name: String,
    pub position_name: String,
    pub apply_date: DateTime<Utc>,
    pub status: JobStatus,
    pub required_skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<JobApplicationRow> for JobApplication {
    fn from(row: JobApplicationRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            warn!("Job application {}: {e}; reading as Applied", row.id);
            JobStatus::Applied
        });
        JobApplication {
            id: row.id,
            company_name: row.company_name,
            position_name: row.position_name,
            apply_date: row.apply_date,
            status,
            required_skills: list_field::decode_stored(
                row.required_skills.as_deref(),
                Separator::Comma,
            ),
            created_at: row.created_at,
        }
    }
}

/// The "Add Job" form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJobApplication {
    pub company_name: String,
    pub position_name: String,
    #[serde(default)]
    pub apply_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub required_skills: ListInput,
}

impl NewJobApplication {
    /// Validates the form and fills in the defaults a new record gets.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<JobApplication, ValidationError> {
        Ok(JobApplication {
            id: Uuid::new_v4(),
            company_name: require_text(&self.company_name, "company name")?,
            position_name: require_text(&self.position_name, "position name")?,
            apply_date: self.apply_date.unwrap_or(now),
            status: self.status,
            required_skills: self.required_skills.into_items(Separator::Comma),
            created_at: now,
        })
    }
}

/// The "Edit Job" form. Omitted status or skills keep their stored values.
#[derive(Debug, Clone, Deserialize)]
pub struct JobEdit {
    pub company_name: String,
    pub position_name: String,
    #[serde(default)]
    pub apply_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub required_skills: Option<ListInput>,
}

impl JobEdit {
    /// Validates everything before touching `record`, so a rejected edit leaves it as it was.
    pub fn apply_to(self, record: &mut JobApplication) -> Result<(), ValidationError> {
        let company_name = require_text(&self.company_name, "company name")?;
        let position_name = require_text(&self.position_name, "position name")?;

        record.company_name = company_name;
        record.position_name = position_name;
        if let Some(date) = self.apply_date {
            record.apply_date = date;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(skills) = self.required_skills {
            record.required_skills = skills.into_items(Separator::Comma);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, skills: Option<&str>) -> JobApplicationRow {
        JobApplicationRow {
            id: Uuid::new_v4(),
            company_name: "Apple".into(),
            position_name: "iOS Developer".into(),
            apply_date: Utc::now(),
            status: status.into(),
            required_skills: skills.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_round_trips_through_display_string() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>(), Ok(status));
        }
        assert_eq!(
            serde_json::to_string(&JobStatus::Interview).unwrap(),
            "\"Interview\""
        );
    }

    #[test]
    fn test_row_with_unknown_status_defaults_to_applied() {
        let job = JobApplication::from(row("Ghosted", None));
        assert_eq!(job.status, JobStatus::Applied);
        assert!(job.required_skills.is_empty());
    }

    #[test]
    fn test_row_with_legacy_skill_text_is_decoded() {
        let job = JobApplication::from(row("Offer", Some("Swift,UIKit,CoreData")));
        assert_eq!(job.status, JobStatus::Offer);
        assert_eq!(job.required_skills, vec!["Swift", "UIKit", "CoreData"]);
    }

    #[test]
    fn test_new_job_requires_company_and_position() {
        let form = NewJobApplication {
            company_name: "  ".into(),
            position_name: "SWE".into(),
            apply_date: None,
            status: JobStatus::Applied,
            required_skills: ListInput::default(),
        };
        assert_eq!(
            form.into_record(Utc::now()),
            Err(ValidationError::Required("company name"))
        );
    }

    #[test]
    fn test_new_job_defaults_apply_date_to_now() {
        let now = Utc::now();
        let form = NewJobApplication {
            company_name: " Google ".into(),
            position_name: "SWE".into(),
            apply_date: None,
            status: JobStatus::Interview,
            required_skills: ListInput::Text("Go, Kubernetes".into()),
        };
        let job = form.into_record(now).unwrap();
        assert_eq!(job.company_name, "Google");
        assert_eq!(job.apply_date, now);
        assert_eq!(job.required_skills, vec!["Go", "Kubernetes"]);
    }

    #[test]
    fn test_edit_keeps_omitted_status_and_skills() {
        let mut job = NewJobApplication {
            company_name: "Apple".into(),
            position_name: "iOS Developer".into(),
            apply_date: None,
            status: JobStatus::Interview,
            required_skills: ListInput::Text("Swift,UIKit".into()),
        }
        .into_record(Utc::now())
        .unwrap();

        let edit: JobEdit = serde_json::from_str(
            r#"{"company_name": "Apple Inc.", "position_name": "Senior iOS Developer"}"#,
        )
        .unwrap();
        edit.apply_to(&mut job).unwrap();
        assert_eq!(job.company_name, "Apple Inc.");
        assert_eq!(job.status, JobStatus::Interview);
        assert_eq!(job.required_skills, vec!["Swift", "UIKit"]);

        let edit: JobEdit = serde_json::from_str(
            r#"{"company_name": "Apple", "position_name": "SWE", "status": "Offer", "required_skills": []}"#,
        )
        .unwrap();
        edit.apply_to(&mut job).unwrap();
        assert_eq!(job.status, JobStatus::Offer);
        assert!(job.required_skills.is_empty());
    }
}
