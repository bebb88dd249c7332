//! NunoDuarte deadlines feed: a JSON list of upcoming conferences plus a
//! dump of past ones that lacks the enclosing brackets.

use chrono::Datelike;
use serde::Deserialize;

use crate::error::{DeadlineError, Result};
use crate::model::{ConferenceInstance, DeadlineRound};
use crate::normalizer::parse_calendar_date;

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    #[serde(default)]
    name: Option<String>,
    deadline: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    link: Option<String>,
    date_start: String,
    #[serde(default)]
    date_end: Option<String>,
}

/// Parse the current-conferences JSON list.
///
/// The edition year comes from `date_start`; an entry whose start date cannot
/// be read fails the whole document.
pub fn parse(json: &str) -> Result<Vec<ConferenceInstance>> {
    let entries: Vec<Entry> = serde_json::from_str(json)?;
    entries.into_iter().map(convert).collect()
}

/// Parse the past-conferences dump: the same objects, comma separated, with
/// a trailing comma and no surrounding brackets.
pub fn parse_past(text: &str) -> Result<Vec<ConferenceInstance>> {
    let mut body = text.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(stripped) = body.strip_suffix(',') {
        body = stripped.trim_end();
    }
    if body.starts_with('[') {
        parse(body)
    } else {
        parse(&format!("[{}]", body))
    }
}

fn convert(entry: Entry) -> Result<ConferenceInstance> {
    let start = parse_calendar_date(&entry.date_start).ok_or_else(|| {
        DeadlineError::UnparsableDate(format!("{}: date_start '{}'", entry.id, entry.date_start))
    })?;
    Ok(ConferenceInstance {
        id: format!("{}{}", entry.id, start.year()),
        shortname: entry.name,
        tags: entry.kind.into_iter().collect(),
        website: entry.link,
        location: entry.location,
        conference_start_date: Some(entry.date_start),
        conference_end_date: entry.date_end,
        timezone: entry.timezone,
        timeline: vec![DeadlineRound::new(entry.deadline)],
        ..ConferenceInstance::default()
    })
}
