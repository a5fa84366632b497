use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::list_field::{self, ListInput, Separator};
use crate::models::require_text;

/// Row tint used when a skill has no colour of its own.
pub const DEFAULT_COLOR: &str = "#007AFF";

/// Target date offered by the add form when none is given.
pub const DEFAULT_LEARNING_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProgressStatus {
    #[serde(rename = "Just Started")]
    JustStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Almost There")]
    AlmostThere,
    Completed,
    Unknown,
}

impl ProgressStatus {
    /// Buckets a progress value. Values outside `[0, 1]` are `Unknown`.
    pub fn from_progress(progress: f64) -> Self {
        match progress {
            p if (0.0..0.3).contains(&p) => ProgressStatus::JustStarted,
            p if (0.3..0.7).contains(&p) => ProgressStatus::InProgress,
            p if (0.7..1.0).contains(&p) => ProgressStatus::AlmostThere,
            p if p == 1.0 => ProgressStatus::Completed,
            _ => ProgressStatus::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::JustStarted => "Just Started",
            ProgressStatus::InProgress => "In Progress",
            ProgressStatus::AlmostThere => "Almost There",
            ProgressStatus::Completed => "Completed",
            ProgressStatus::Unknown => "Unknown",
        }
    }
}

/// A dated free-text note in a skill's learning log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyUpdate {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDailyUpdate {
    pub note: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl NewDailyUpdate {
    pub fn into_update(self, now: DateTime<Utc>) -> Result<DailyUpdate, ValidationError> {
        Ok(DailyUpdate {
            id: Uuid::new_v4(),
            date: self.date.unwrap_or(now),
            note: require_text(&self.note, "note")?,
        })
    }
}

/// A `skill_learnings` row as stored. `color` and `daily_updates` are
/// NULL on rows written before those columns existed.
#[derive(Debug, Clone, FromRow)]
pub struct SkillLearningRow {
    pub id: Uuid,
    pub skill_name: String,
    pub start_date: DateTime<Utc>,
    pub target_date: DateTime<Utc>,
    pub progress: f64,
    pub resources: Option<String>,
    pub color: Option<String>,
    pub daily_updates: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillLearning {
    pub id: Uuid,
    pub skill_name: String,
    pub start_date: DateTime<Utc>,
    pub target_date: DateTime<Utc>,
    pub progress: f64,
    pub resources: Vec<String>,
    pub color: String,
    pub daily_updates: Vec<DailyUpdate>,
    pub created_at: DateTime<Utc>,
}

impl From<SkillLearningRow> for SkillLearning {
    fn from(row: SkillLearningRow) -> Self {
        let color = match row.color.as_deref().map(normalize_color) {
            Some(Ok(color)) => color,
            Some(Err(e)) => {
                warn!("Skill {}: {e}; using the default colour", row.id);
                DEFAULT_COLOR.to_string()
            }
            None => DEFAULT_COLOR.to_string(),
        };

        let daily_updates = match row.daily_updates.as_deref() {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!("Skill {}: unreadable daily updates ({e}); reading as empty", row.id);
                Vec::new()
            }),
            None => Vec::new(),
        };

        SkillLearning {
            id: row.id,
            skill_name: row.skill_name,
            start_date: row.start_date,
            target_date: row.target_date,
            progress: row.progress,
            resources: list_field::decode_stored(row.resources.as_deref(), Separator::Newline),
            color,
            daily_updates,
            created_at: row.created_at,
        }
    }
}

/// Tolerance for the binary representation of two-decimal progress values.
const PERCENT_EPSILON: f64 = 1e-9;

impl SkillLearning {
    pub fn progress_status(&self) -> ProgressStatus {
        ProgressStatus::from_progress(self.progress)
    }

    /// Whole percent, truncated. 0.57 is 57, not 56.
    pub fn progress_percent(&self) -> i64 {
        (self.progress * 100.0 + PERCENT_EPSILON).floor() as i64
    }

    pub fn is_active(&self) -> bool {
        self.progress < 1.0
    }

    /// Whole days from `now` until the target date, never negative.
    /// A record whose target precedes its start reports 0.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        if self.target_date < self.start_date {
            return 0;
        }
        (self.target_date - now).num_days().max(0)
    }
}

/// Rejects NaN and clamps into `[0, 1]`.
pub fn clamp_progress(progress: f64) -> Result<f64, ValidationError> {
    if progress.is_nan() {
        return Err(ValidationError::ProgressNotANumber);
    }
    Ok(progress.clamp(0.0, 1.0))
}

/// Accepts `#RRGGBB` or `#RRGGBBAA`, returned upper-cased.
pub fn normalize_color(color: &str) -> Result<String, ValidationError> {
    let color = color.trim();
    let valid = color
        .strip_prefix('#')
        .map(|hex| (hex.len() == 6 || hex.len() == 8) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);
    if !valid {
        return Err(ValidationError::InvalidColor(color.to_string()));
    }
    Ok(color.to_ascii_uppercase())
}

fn check_dates(start: DateTime<Utc>, target: DateTime<Utc>) -> Result<(), ValidationError> {
    if target < start {
        return Err(ValidationError::TargetBeforeStart);
    }
    Ok(())
}

/// The "New Skill" form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSkillLearning {
    pub skill_name: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub resources: ListInput,
    #[serde(default)]
    pub color: Option<String>,
}

impl NewSkillLearning {
    pub fn new(skill_name: impl Into<String>) -> Self {
        NewSkillLearning {
            skill_name: skill_name.into(),
            start_date: None,
            target_date: None,
            progress: 0.0,
            resources: ListInput::default(),
            color: None,
        }
    }

    pub fn into_record(self, now: DateTime<Utc>) -> Result<SkillLearning, ValidationError> {
        let skill_name = require_text(&self.skill_name, "skill name")?;
        let start_date = self.start_date.unwrap_or(now);
        let target_date = self
            .target_date
            .unwrap_or(start_date + Duration::days(DEFAULT_LEARNING_DAYS));
        check_dates(start_date, target_date)?;

        let color = match self.color.as_deref() {
            Some(color) => normalize_color(color)?,
            None => DEFAULT_COLOR.to_string(),
        };

        Ok(SkillLearning {
            id: Uuid::new_v4(),
            skill_name,
            start_date,
            target_date,
            progress: clamp_progress(self.progress)?,
            resources: self.resources.into_items(Separator::Newline),
            color,
            daily_updates: Vec::new(),
            created_at: now,
        })
    }
}

/// The "Edit Skill" form: name and time frame.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillEdit {
    pub skill_name: String,
    pub start_date: DateTime<Utc>,
    pub target_date: DateTime<Utc>,
}

impl SkillEdit {
    pub fn apply_to(self, skill: &mut SkillLearning) -> Result<(), ValidationError> {
        let skill_name = require_text(&self.skill_name, "skill name")?;
        check_dates(self.start_date, self.target_date)?;
        skill.skill_name = skill_name;
        skill.start_date = self.start_date;
        skill.target_date = self.target_date;
        Ok(())
    }
}

/// A skill together with the values the detail and list screens derive from it.
#[derive(Debug, Clone, Serialize)]
pub struct SkillView {
    #[serde(flatten)]
    pub skill: SkillLearning,
    pub progress_status: ProgressStatus,
    pub progress_percent: i64,
    pub days_remaining: i64,
}

impl SkillView {
    pub fn new(skill: SkillLearning, now: DateTime<Utc>) -> Self {
        SkillView {
            progress_status: skill.progress_status(),
            progress_percent: skill.progress_percent(),
            days_remaining: skill.days_remaining(now),
            skill,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_buckets() {
        assert_eq!(ProgressStatus::from_progress(0.0), ProgressStatus::JustStarted);
        assert_eq!(ProgressStatus::from_progress(0.29), ProgressStatus::JustStarted);
        assert_eq!(ProgressStatus::from_progress(0.3), ProgressStatus::InProgress);
        assert_eq!(ProgressStatus::from_progress(0.69), ProgressStatus::InProgress);
        assert_eq!(ProgressStatus::from_progress(0.7), ProgressStatus::AlmostThere);
        assert_eq!(ProgressStatus::from_progress(0.999), ProgressStatus::AlmostThere);
        assert_eq!(ProgressStatus::from_progress(1.0), ProgressStatus::Completed);
    }

    #[test]
    fn test_progress_out_of_range_is_unknown() {
        assert_eq!(ProgressStatus::from_progress(-0.1), ProgressStatus::Unknown);
        assert_eq!(ProgressStatus::from_progress(1.2), ProgressStatus::Unknown);
        assert_eq!(ProgressStatus::from_progress(f64::NAN), ProgressStatus::Unknown);
    }

    #[test]
    fn test_progress_status_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&ProgressStatus::AlmostThere).unwrap(),
            "\"Almost There\""
        );
    }

    #[test]
    fn test_clamp_progress() {
        assert_eq!(clamp_progress(1.5), Ok(1.0));
        assert_eq!(clamp_progress(-2.0), Ok(0.0));
        assert_eq!(clamp_progress(0.25), Ok(0.25));
        assert_eq!(clamp_progress(f64::NAN), Err(ValidationError::ProgressNotANumber));
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#ff8800"), Ok("#FF8800".to_string()));
        assert_eq!(normalize_color("#FF880080"), Ok("#FF880080".to_string()));
        assert!(normalize_color("ff8800").is_err());
        assert!(normalize_color("#ggg000").is_err());
    }

    #[test]
    fn test_new_skill_rejects_target_before_start() {
        let now = Utc::now();
        let mut form = NewSkillLearning::new("Rust");
        form.start_date = Some(now);
        form.target_date = Some(now - Duration::days(1));
        assert_eq!(form.into_record(now), Err(ValidationError::TargetBeforeStart));
    }

    #[test]
    fn test_new_skill_defaults() {
        let now = Utc::now();
        let mut form = NewSkillLearning::new(" SwiftUI ");
        form.progress = 3.0;
        form.resources = ListInput::Text("https://a.example\n\nhttps://b.example\n".into());
        let skill = form.into_record(now).unwrap();
        assert_eq!(skill.skill_name, "SwiftUI");
        assert_eq!(skill.start_date, now);
        assert_eq!(skill.target_date, now + Duration::days(DEFAULT_LEARNING_DAYS));
        assert_eq!(skill.progress, 1.0);
        assert_eq!(skill.color, DEFAULT_COLOR);
        assert_eq!(skill.resources, vec!["https://a.example", "https://b.example"]);
        assert!(skill.daily_updates.is_empty());
    }

    #[test]
    fn test_days_remaining_is_zero_when_dates_are_inverted() {
        let now = Utc::now();
        let mut skill = NewSkillLearning::new("Rust").into_record(now).unwrap();
        skill.start_date = now + Duration::days(10);
        skill.target_date = now + Duration::days(5);
        assert_eq!(skill.days_remaining(now), 0);
    }

    #[test]
    fn test_days_remaining_counts_whole_days_and_never_goes_negative() {
        let now = Utc::now();
        let mut skill = NewSkillLearning::new("Rust").into_record(now).unwrap();
        skill.target_date = now + Duration::days(12) + Duration::hours(3);
        assert_eq!(skill.days_remaining(now), 12);

        skill.start_date = now - Duration::days(30);
        skill.target_date = now - Duration::days(2);
        assert_eq!(skill.days_remaining(now), 0);
    }

    #[test]
    fn test_legacy_row_reads_with_defaults() {
        let now = Utc::now();
        let row = SkillLearningRow {
            id: Uuid::new_v4(),
            skill_name: "SwiftUI".into(),
            start_date: now,
            target_date: now + Duration::days(30),
            progress: 0.25,
            resources: Some("https://developer.apple.com\nhttps://hackingwithswift.com".into()),
            color: None,
            daily_updates: None,
            created_at: now,
        };
        let skill = SkillLearning::from(row);
        assert_eq!(skill.color, DEFAULT_COLOR);
        assert!(skill.daily_updates.is_empty());
        assert_eq!(skill.resources.len(), 2);
        assert_eq!(skill.progress_percent(), 25);
    }

    #[test]
    fn test_progress_percent_is_not_off_by_one() {
        let mut skill = NewSkillLearning::new("Rust").into_record(Utc::now()).unwrap();
        for (progress, percent) in [(0.29, 29), (0.57, 57), (0.58, 58), (0.999, 99), (1.0, 100)] {
            skill.progress = progress;
            assert_eq!(skill.progress_percent(), percent, "progress {progress}");
        }
    }

    #[test]
    fn test_skill_edit_validates_dates() {
        let now = Utc::now();
        let mut skill = NewSkillLearning::new("Rust").into_record(now).unwrap();
        let edit = SkillEdit {
            skill_name: "Rust async".into(),
            start_date: now,
            target_date: now - Duration::days(3),
        };
        assert_eq!(edit.apply_to(&mut skill), Err(ValidationError::TargetBeforeStart));
        assert_eq!(skill.skill_name, "Rust");
    }

    #[test]
    fn test_view_includes_derived_fields() {
        let now = Utc::now();
        let mut form = NewSkillLearning::new("Rust");
        form.progress = 0.65;
        let view = SkillView::new(form.into_record(now).unwrap(), now);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["progress_status"], "In Progress");
        assert_eq!(json["progress_percent"], 65);
        assert_eq!(json["skill_name"], "Rust");
        assert_eq!(json["days_remaining"], DEFAULT_LEARNING_DAYS);
    }
}
