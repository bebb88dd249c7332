//! Persistence: one YAML file per family, and the flattened per-round
//! partition consumed by the display layer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;
use crate::model::{ConferenceInstance, DataSource};
use crate::normalizer::parse_instant;

pub const FUTURE_FILE: &str = "conferences.json";
pub const ARCHIVE_FILE: &str = "conferences_archive.json";

static UTC_OFFSET_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:UTC|GMT)([+-])(\d{1,2})$").expect("valid offset regex"));

/// Read one family file: a mapping from id to record. An empty `id` is
/// filled from its key.
pub fn load_family_file(path: &Path) -> Result<BTreeMap<String, ConferenceInstance>> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let family: Option<BTreeMap<String, ConferenceInstance>> = serde_yaml::from_str(&text)?;
    let mut family = family.unwrap_or_default();
    for (key, conf) in family.iter_mut() {
        if conf.id.is_empty() {
            conf.id.clone_from(key);
        }
    }
    Ok(family)
}

/// Read every `*.yaml`/`*.yml` file in `dir`, in file-name order.
/// A missing directory holds no records.
pub fn load_dir(dir: &Path) -> Result<Vec<ConferenceInstance>> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "conference directory does not exist");
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        records.extend(load_family_file(&path)?.into_values());
    }
    Ok(records)
}

/// Write each family to `<dir>/<family>.yaml`, creating `dir` if needed.
pub fn write_families(
    dir: &Path,
    families: &BTreeMap<String, BTreeMap<String, ConferenceInstance>>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(families.len());
    for (family, members) in families {
        let path = dir.join(format!("{}.yaml", family));
        std::fs::write(&path, serde_yaml::to_string(members)?)?;
        tracing::debug!(path = %path.display(), count = members.len(), "wrote family");
        written.push(path);
    }
    Ok(written)
}

/// Delete family files in `dir` whose family is not in `families`: families
/// renamed into another one, or emptied by cleanup. Returns the removed paths.
pub fn remove_stale_families(
    dir: &Path,
    families: &BTreeMap<String, BTreeMap<String, ConferenceInstance>>,
) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut removed = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_family_file = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        let Some(family) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if is_family_file && !families.contains_key(family) {
            std::fs::remove_file(&path)?;
            tracing::info!(path = %path.display(), "removed stale family file");
            removed.push(path);
        }
    }
    removed.sort();
    Ok(removed)
}

/// One deadline round flattened together with its edition's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    /// `<instance id>-<1-based round number>`
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortname: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub is_approximate_deadline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_src: Option<DataSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(rename = "h5Index", default, skip_serializing_if = "Option::is_none")]
    pub h5_index: Option<u32>,
    pub deadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstract_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Rounds whose deadline is still ahead.
    pub future: Vec<RoundRecord>,
    /// Rounds whose deadline has passed.
    pub past: Vec<RoundRecord>,
}

/// Split every round of every instance into future and past relative to `now`.
/// Rounds with an unreadable deadline are reported and left out.
pub fn partition<'a>(
    instances: impl IntoIterator<Item = &'a ConferenceInstance>,
    now: DateTime<Utc>,
    diagnostics: &mut Diagnostics,
) -> Partition {
    let mut out = Partition::default();
    for conf in instances {
        for (i, round) in conf.timeline.iter().enumerate() {
            let id = format!("{}-{}", conf.id, i + 1);
            let Some(deadline) = parse_instant(&round.deadline) else {
                diagnostics.record(
                    DiagnosticKind::DateParse,
                    id,
                    format!("unreadable deadline '{}' left out of export", round.deadline),
                );
                continue;
            };
            let record = RoundRecord {
                id,
                title: conf.title.clone(),
                shortname: conf.shortname.clone(),
                tags: conf.tags.clone(),
                website: conf.website.clone(),
                location: conf.location.clone(),
                is_approximate_deadline: conf.is_approximate_deadline,
                conference_start_date: conf.conference_start_date.clone(),
                conference_end_date: conf.conference_end_date.clone(),
                timezone: conf.timezone.as_deref().map(display_timezone),
                data_src: conf.data_src,
                rating: conf.rating.clone(),
                h5_index: conf.h5_index,
                deadline: round.deadline.clone(),
                abstract_deadline: round.abstract_deadline.clone(),
                note: round.note.clone(),
            };
            if deadline > now {
                out.future.push(record);
            } else {
                out.past.push(record);
            }
        }
    }
    out
}

/// IANA spelling of a stored timezone for the display layer:
/// `AoE` → `Etc/GMT+12`, `UTC-7` → `Etc/GMT+7`, `Russia/Moscow` → `Europe/Moscow`.
///
/// `Etc/GMT` names carry the inverted sign of the offset they denote.
pub fn display_timezone(timezone: &str) -> String {
    let tz = timezone.trim();
    match tz {
        "AoE" => return "Etc/GMT+12".to_string(),
        "Russia/Moscow" => return "Europe/Moscow".to_string(),
        _ => {}
    }
    if let Some(caps) = UTC_OFFSET_NAME.captures(tz) {
        let inverted = if &caps[1] == "-" { '+' } else { '-' };
        let hours: u32 = caps[2].parse().unwrap_or(0);
        if hours == 0 {
            return "Etc/GMT".to_string();
        }
        return format!("Etc/GMT{}{}", inverted, hours);
    }
    tz.to_string()
}

/// Write the partition as `conferences.json` and `conferences_archive.json`.
pub fn write_partition(dir: &Path, partition: &Partition) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let future = dir.join(FUTURE_FILE);
    let past = dir.join(ARCHIVE_FILE);
    std::fs::write(&future, serde_json::to_string(&partition.future)?)?;
    std::fs::write(&past, serde_json::to_string(&partition.past)?)?;
    tracing::info!(
        future = partition.future.len(),
        past = partition.past.len(),
        "wrote display partition"
    );
    Ok((future, past))
}
