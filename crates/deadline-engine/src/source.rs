//! Source collaborators -- anything that hands partial records to the pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::model::{ConferenceInstance, DataSource};

/// A provider of partial conference records at a fixed trust level.
///
/// `fetch` may fail for transport or format reasons; the pipeline records the
/// failure and carries on as if the source returned nothing.
pub trait Source {
    fn name(&self) -> &str;
    fn trust(&self) -> DataSource;
    fn fetch(&mut self) -> Result<Vec<ConferenceInstance>>;
}

/// Records already in memory, e.g. produced by a scraper in the same process.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    trust: DataSource,
    records: Vec<ConferenceInstance>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, trust: DataSource, records: Vec<ConferenceInstance>) -> Self {
        Self {
            name: name.into(),
            trust,
            records,
        }
    }
}

impl Source for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn trust(&self) -> DataSource {
        self.trust
    }

    fn fetch(&mut self) -> Result<Vec<ConferenceInstance>> {
        Ok(std::mem::take(&mut self.records))
    }
}

/// Partial records in a local YAML or JSON file, either as a list or as a
/// mapping from id to record (the persisted layout). Used for manual
/// overrides and for dumps written by website scrapers.
#[derive(Debug, Clone)]
pub struct RecordsFile {
    name: String,
    trust: DataSource,
    paths: Vec<PathBuf>,
}

impl RecordsFile {
    pub fn new(name: impl Into<String>, trust: DataSource, paths: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            trust,
            paths,
        }
    }
}

impl Source for RecordsFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn trust(&self) -> DataSource {
        self.trust
    }

    fn fetch(&mut self) -> Result<Vec<ConferenceInstance>> {
        let mut records = Vec::new();
        for path in &self.paths {
            records.extend(read_records(path)?);
        }
        Ok(records)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsDoc {
    List(Vec<ConferenceInstance>),
    Map(BTreeMap<String, ConferenceInstance>),
}

/// Read a records file. JSON is chosen by the `.json` extension, YAML otherwise.
/// In the mapping layout an empty `id` is filled from its key.
pub fn read_records(path: &Path) -> Result<Vec<ConferenceInstance>> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let doc: Option<RecordsDoc> = if is_json {
        serde_json::from_str(&text)?
    } else {
        serde_yaml::from_str(&text)?
    };
    let records = match doc {
        None => Vec::new(),
        Some(RecordsDoc::List(list)) => list,
        Some(RecordsDoc::Map(map)) => map
            .into_iter()
            .map(|(key, mut conf)| {
                if conf.id.is_empty() {
                    conf.id = key;
                }
                conf
            })
            .collect(),
    };
    Ok(records)
}
