//! Summary prompt templates and the builders that fill them.
//!
//! User text is embedded verbatim. The output is only ever read by a language model.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::job::JobApplication;
use crate::models::research::ResearchApplication;
use crate::models::skill::SkillLearning;

/// How many of the most recent records a prompt describes.
pub const RECENT_RECORDS: usize = 5;

pub const JOB_ANALYSIS_PROMPT: &str = "\
Analyze these job applications:
- Total: {total}
- Statuses: {statuses}
- Required skills: {skills}

Provide insights on application patterns and skill gaps.";

pub const RESEARCH_ANALYSIS_PROMPT: &str = "\
Analyze these research applications:
- Total: {total}
- Fields: {fields}
- Statuses: {statuses}

Identify trends and suggest improvement areas.";

pub const SKILL_ANALYSIS_PROMPT: &str = "\
Analyze these learning progressions:
{progress_report}

Suggest focus areas and time management tips.";

/// Newest first, at most `RECENT_RECORDS`. The sort is stable, so records
/// sharing a date keep the order they were fetched in.
fn most_recent<T>(records: &[T], date: impl Fn(&T) -> DateTime<Utc>) -> Vec<&T> {
    let mut sorted: Vec<&T> = records.iter().collect();
    sorted.sort_by(|a, b| date(b).cmp(&date(a)));
    sorted.truncate(RECENT_RECORDS);
    sorted
}

/// Group sizes in order of first appearance.
fn count_by<T>(records: &[&T], key: impl Fn(&T) -> String) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in records {
        let key = key(record);
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }
    counts
}

fn render_counts(counts: &[(String, usize)]) -> String {
    counts
        .iter()
        .map(|(key, count)| format!("{key}: {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Distinct values, first occurrence wins.
fn distinct<'a>(values: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(String::as_str)
        .filter(|v| seen.insert(*v))
        .collect()
}

pub fn build_job_prompt(jobs: &[JobApplication]) -> String {
    let recent = most_recent(jobs, |j| j.apply_date);
    let statuses = count_by(&recent, |j| j.status.to_string());
    let skills = distinct(recent.iter().flat_map(|j| j.required_skills.iter()));

    JOB_ANALYSIS_PROMPT
        .replace("{total}", &recent.len().to_string())
        .replace("{statuses}", &render_counts(&statuses))
        .replace("{skills}", &skills.join(", "))
}

pub fn build_research_prompt(items: &[ResearchApplication]) -> String {
    let recent = most_recent(items, |r| r.apply_date);
    let statuses = count_by(&recent, |r| r.status.to_string());
    let fields = count_by(&recent, |r| r.research_field.clone());

    RESEARCH_ANALYSIS_PROMPT
        .replace("{total}", &recent.len().to_string())
        .replace("{statuses}", &render_counts(&statuses))
        .replace("{fields}", &render_counts(&fields))
}

/// Describes every skill still in progress as "name: NN%".
pub fn build_skill_prompt(skills: &[SkillLearning]) -> String {
    let report = skills
        .iter()
        .filter(|s| s.is_active())
        .map(|s| format!("{}: {}%", s.skill_name, s.progress_percent()))
        .collect::<Vec<_>>()
        .join("\n");

    SKILL_ANALYSIS_PROMPT.replace("{progress_report}", &report)
}
