//! Hugging Face `ai-deadlines` feed: one YAML list of editions per file.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::enrich::TAG_SYNONYMS;
use crate::error::Result;
use crate::model::{ConferenceInstance, DeadlineRound};

/// "June 11-15, 2025", "Dec 30 - Jan 3, 2026"
static DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][a-z]+)[ ,]*(\d+) *[-|–] *([A-Za-z]*) *(\d+), *(\d+)$")
        .expect("valid date range regex")
});

#[derive(Debug, Deserialize)]
struct Entry {
    title: String,
    #[serde(default)]
    year: Option<serde_yaml::Value>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    deadline: Option<String>,
    #[serde(default)]
    deadlines: Vec<TypedDeadline>,
    #[serde(default)]
    abstract_deadline: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TypedDeadline {
    #[serde(rename = "type")]
    kind: String,
    date: String,
    #[serde(default)]
    label: Option<String>,
}

/// Parse one feed file. Entries without a submission deadline or without a
/// readable conference date range are skipped.
pub fn parse(yaml: &str) -> Result<Vec<ConferenceInstance>> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let entries: Option<Vec<Entry>> = serde_yaml::from_str(yaml)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(convert)
        .collect())
}

fn convert(entry: Entry) -> Option<ConferenceInstance> {
    let year = entry.year.as_ref().and_then(scalar);
    let compact: String = entry.title.split_whitespace().collect();
    let (id, shortname) = match &year {
        Some(year) if compact.chars().all(|c| c.is_ascii_alphabetic()) => (
            format!("{}{}", compact.to_lowercase(), year),
            format!("{} {}", compact, year),
        ),
        _ => (compact.to_lowercase(), compact.clone()),
    };

    let mut timeline: Vec<DeadlineRound> = entry.deadline.iter().map(DeadlineRound::new).collect();
    timeline.extend(
        entry
            .deadlines
            .iter()
            .filter(|d| d.kind == "submission")
            .map(|d| DeadlineRound {
                deadline: d.date.clone(),
                abstract_deadline: None,
                note: d.label.clone(),
            }),
    );
    if timeline.is_empty() {
        tracing::warn!(%id, "no timeline for hf entry");
        return None;
    }
    if let Some(abstract_deadline) = entry.abstract_deadline {
        timeline[0].abstract_deadline = Some(abstract_deadline);
    }

    let (start, end) = match (entry.start, entry.end) {
        (Some(start), end) => (Some(start), end),
        (None, _) => {
            let date = entry.date.as_deref().map(str::trim).unwrap_or_default();
            let Some(caps) = DATE_RANGE.captures(date) else {
                tracing::info!(%id, date, "skipping hf entry with unreadable date");
                return None;
            };
            let end_month = if caps[3].is_empty() { &caps[1] } else { &caps[3] };
            (
                Some(format!("{} {}, {}", &caps[1], &caps[2], &caps[5])),
                Some(format!("{} {}, {}", end_month, &caps[4], &caps[5])),
            )
        }
    };

    let location = entry.venue.or_else(|| {
        let parts: Vec<String> = [entry.city, entry.country].into_iter().flatten().collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    });

    Some(ConferenceInstance {
        id,
        title: entry.full_name,
        shortname: Some(shortname),
        tags: entry
            .tags
            .iter()
            .filter_map(|tag| {
                TAG_SYNONYMS
                    .iter()
                    .find(|(long, _)| *long == tag.as_str())
                    .map(|(_, short)| short.to_string())
            })
            .collect(),
        website: entry.link,
        location,
        conference_start_date: start,
        conference_end_date: end,
        timezone: entry.timezone,
        timeline,
        ..ConferenceInstance::default()
    })
}

fn scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}
