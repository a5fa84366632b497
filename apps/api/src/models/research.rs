use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::models::require_text;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ResearchStatus {
    #[default]
    Preparing,
    Submitted,
    #[serde(rename = "Under Review")]
    UnderReview,
    Accepted,
    Rejected,
}

impl ResearchStatus {
    pub const ALL: [ResearchStatus; 5] = [
        ResearchStatus::Preparing,
        ResearchStatus::Submitted,
        ResearchStatus::UnderReview,
        ResearchStatus::Accepted,
        ResearchStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResearchStatus::Preparing => "Preparing",
            ResearchStatus::Submitted => "Submitted",
            ResearchStatus::UnderReview => "Under Review",
            ResearchStatus::Accepted => "Accepted",
            ResearchStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResearchStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown research status '{s}'"))
    }
}

/// A `research_applications` row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct ResearchApplicationRow {
    pub id: Uuid,
    pub university_name: String,
    pub professor_name: String,
    pub research_field: String,
    pub apply_date: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchApplication {
    pub id: Uuid,
    pub university_name: String,
    pub professor_name: String,
    pub research_field: String,
    pub apply_date: DateTime<Utc>,
    pub status: ResearchStatus,
    pub created_at: DateTime<Utc>,
}

impl From<ResearchApplicationRow> for ResearchApplication {
    fn from(row: ResearchApplicationRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            warn!("Research application {}: {e}; reading as Preparing", row.id);
            ResearchStatus::Preparing
        });
        ResearchApplication {
            id: row.id,
            university_name: row.university_name,
            professor_name: row.professor_name,
            research_field: row.research_field,
            apply_date: row.apply_date,
            status,
            created_at: row.created_at,
        }
    }
}

/// The "Add Research" form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewResearchApplication {
    pub university_name: String,
    pub professor_name: String,
    pub research_field: String,
    #[serde(default)]
    pub apply_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ResearchStatus,
}

impl NewResearchApplication {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<ResearchApplication, ValidationError> {
        Ok(ResearchApplication {
            id: Uuid::new_v4(),
            university_name: require_text(&self.university_name, "university name")?,
            professor_name: require_text(&self.professor_name, "professor name")?,
            research_field: require_text(&self.research_field, "research field")?,
            apply_date: self.apply_date.unwrap_or(now),
            status: self.status,
            created_at: now,
        })
    }
}

/// The "Edit Research" form. An omitted status keeps the stored one.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchEdit {
    pub university_name: String,
    pub professor_name: String,
    pub research_field: String,
    #[serde(default)]
    pub apply_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<ResearchStatus>,
}

impl ResearchEdit {
    /// Applies the form to an existing record, keeping its identity.
    /// A rejected edit leaves the record as it was.
    pub fn apply_to(self, record: &mut ResearchApplication) -> Result<(), ValidationError> {
        let university_name = require_text(&self.university_name, "university name")?;
        let professor_name = require_text(&self.professor_name, "professor name")?;
        let research_field = require_text(&self.research_field, "research field")?;

        record.university_name = university_name;
        record.professor_name = professor_name;
        record.research_field = research_field;
        if let Some(date) = self.apply_date {
            record.apply_date = date;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_review_uses_display_string() {
        assert_eq!(
            serde_json::to_string(&ResearchStatus::UnderReview).unwrap(),
            "\"Under Review\""
        );
        assert_eq!(
            "under review".parse::<ResearchStatus>(),
            Ok(ResearchStatus::UnderReview)
        );
    }

    #[test]
    fn test_edit_form_rejects_blank_field_without_mutating() {
        let mut record = NewResearchApplication {
            university_name: "Stanford".into(),
            professor_name: "Dr. Smith".into(),
            research_field: "Computer Science".into(),
            apply_date: None,
            status: ResearchStatus::Submitted,
        }
        .into_record(Utc::now())
        .unwrap();
        let original = record.clone();

        let edit = ResearchEdit {
            university_name: "MIT".into(),
            professor_name: "Dr. Jones".into(),
            research_field: " ".into(),
            apply_date: None,
            status: Some(ResearchStatus::Accepted),
        };
        assert_eq!(
            edit.apply_to(&mut record),
            Err(ValidationError::Required("research field"))
        );
        assert_eq!(record, original);

        let edit = ResearchEdit {
            university_name: "MIT".into(),
            professor_name: "Dr. Jones".into(),
            research_field: "Robotics".into(),
            apply_date: None,
            status: Some(ResearchStatus::Accepted),
        };
        edit.apply_to(&mut record).unwrap();
        assert_eq!(record.id, original.id);
        assert_eq!(record.status, ResearchStatus::Accepted);
        assert_eq!(record.apply_date, original.apply_date);
    }

    #[test]
    fn test_edit_without_status_keeps_stored_status() {
        let mut record = NewResearchApplication {
            university_name: "Stanford".into(),
            professor_name: "Dr. Smith".into(),
            research_field: "Computer Science".into(),
            apply_date: None,
            status: ResearchStatus::UnderReview,
        }
        .into_record(Utc::now())
        .unwrap();

        let edit: ResearchEdit = serde_json::from_str(
            r#"{"university_name": "Stanford", "professor_name": "Dr. Smith", "research_field": "HCI"}"#,
        )
        .unwrap();
        edit.apply_to(&mut record).unwrap();
        assert_eq!(record.research_field, "HCI");
        assert_eq!(record.status, ResearchStatus::UnderReview);
    }
}
