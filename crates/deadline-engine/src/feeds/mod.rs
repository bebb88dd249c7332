//! Adapters for third-party deadline feeds.
//!
//! Each adapter turns one already-downloaded feed document into partial
//! [`ConferenceInstance`](crate::ConferenceInstance) records. Dates are
//! passed through as written; the pipeline normalizes them.
//!
//! - [`hf`] — Hugging Face `ai-deadlines` conference YAML files
//! - [`ccf`] — `ccf-deadlines` conference YAML files
//! - [`nino`] — NunoDuarte deadlines JSON list and its past-conference dump

pub mod ccf;
pub mod hf;
pub mod nino;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ConferenceInstance, DataSource};
use crate::source::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    Hf,
    Ccf,
    Nino,
}

impl FeedFormat {
    /// Trust level the feed is known under.
    pub fn default_trust(&self) -> DataSource {
        match self {
            FeedFormat::Hf => DataSource::HfRepo,
            FeedFormat::Ccf => DataSource::CcfDeadlines,
            FeedFormat::Nino => DataSource::NinoduarteGit,
        }
    }
}

/// A feed read from local snapshot files.
#[derive(Debug, Clone)]
pub struct FeedFile {
    name: String,
    format: FeedFormat,
    trust: DataSource,
    paths: Vec<PathBuf>,
}

impl FeedFile {
    pub fn new(name: impl Into<String>, format: FeedFormat, paths: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            format,
            trust: format.default_trust(),
            paths,
        }
    }

    pub fn with_trust(mut self, trust: DataSource) -> Self {
        self.trust = trust;
        self
    }
}

impl Source for FeedFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn trust(&self) -> DataSource {
        self.trust
    }

    fn fetch(&mut self) -> Result<Vec<ConferenceInstance>> {
        let mut records = Vec::new();
        for path in &self.paths {
            let text = std::fs::read_to_string(path)?;
            let parsed = match self.format {
                FeedFormat::Hf => hf::parse(&text)?,
                FeedFormat::Ccf => ccf::parse(&text)?,
                FeedFormat::Nino if path.extension().is_some_and(|ext| ext == "txt") => {
                    nino::parse_past(&text)?
                }
                FeedFormat::Nino => nino::parse(&text)?,
            };
            tracing::debug!(path = %path.display(), count = parsed.len(), "read feed file");
            records.extend(parsed);
        }
        Ok(records)
    }
}
