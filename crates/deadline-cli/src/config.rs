//! `aideadlines.toml` -- where the data lives and which sources feed a run.
//!
//! Every key is optional. Resolution order, highest priority first: command
//! line flags, the config file, compiled defaults.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use deadline_engine::feeds::{FeedFile, FeedFormat};
use deadline_engine::{DataSource, ProjectionOptions, RecordsFile, Source};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "aideadlines.toml";

/// Upper bound for both projection limits.
const MAX_PROJECTION_LIMIT: i32 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding one `<family>.yaml` per conference family.
    pub conference_dir: PathBuf,
    /// Directory receiving `conferences.json` and `conferences_archive.json`.
    pub output_dir: PathBuf,
    /// Durable log the run's diagnostics are appended to.
    pub error_log: PathBuf,
    pub horizon_years: i32,
    pub max_speculative_multiplier: i32,
    pub unite_tags: bool,
    pub ranking: RankingConfig,
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let projection = ProjectionOptions::default();
        Self {
            conference_dir: PathBuf::from("conferences"),
            output_dir: PathBuf::from("data"),
            error_log: PathBuf::from("error.log"),
            horizon_years: projection.horizon_years,
            max_speculative_multiplier: projection.max_speculative_multiplier,
            unite_tags: true,
            ranking: RankingConfig::default(),
            sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    /// YAML mapping family → Google Scholar h5-index.
    pub h5_index: Option<PathBuf>,
    /// YAML mapping family → CORE rank.
    pub core: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Hf,
    Ccf,
    Nino,
    /// Partial records in the persisted layout (manual edits, scraper dumps).
    Records,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub name: String,
    pub format: SourceFormat,
    pub paths: Vec<PathBuf>,
    /// Required for `records`; feeds default to the trust they are known under.
    #[serde(default)]
    pub trust: Option<DataSource>,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Read `path`, or `aideadlines.toml` in the working directory when no
    /// path is given. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !explicit && !path.exists() {
            tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config =
            Self::from_toml(&text).with_context(|| format!("in {}", path.display()))?;
        config.resolve_relative_to(path.parent().unwrap_or(Path::new("")));
        config.validate()?;
        Ok(config)
    }

    /// Paths in a config file are relative to the file itself.
    fn resolve_relative_to(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.conference_dir);
        join(&mut self.output_dir);
        join(&mut self.error_log);
        if let Some(p) = self.ranking.h5_index.as_mut() {
            join(p);
        }
        if let Some(p) = self.ranking.core.as_mut() {
            join(p);
        }
        for source in &mut self.sources {
            source.paths.iter_mut().for_each(|p| join(p));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_PROJECTION_LIMIT).contains(&self.horizon_years) {
            bail!("horizon_years must be between 0 and {}", MAX_PROJECTION_LIMIT);
        }
        if !(1..=MAX_PROJECTION_LIMIT).contains(&self.max_speculative_multiplier) {
            bail!(
                "max_speculative_multiplier must be between 1 and {}",
                MAX_PROJECTION_LIMIT
            );
        }
        for source in &self.sources {
            if source.format == SourceFormat::Records && source.trust.is_none() {
                bail!("source '{}': records sources need an explicit trust", source.name);
            }
        }
        Ok(())
    }

    pub fn projection(&self) -> ProjectionOptions {
        ProjectionOptions {
            horizon_years: self.horizon_years,
            max_speculative_multiplier: self.max_speculative_multiplier,
        }
    }

    /// Instantiate the configured sources.
    pub fn build_sources(&self) -> Vec<Box<dyn Source>> {
        self.sources
            .iter()
            .map(|cfg| -> Box<dyn Source> {
                let feed = |format: FeedFormat| {
                    let file = FeedFile::new(&cfg.name, format, cfg.paths.clone());
                    match cfg.trust {
                        Some(trust) => file.with_trust(trust),
                        None => file,
                    }
                };
                match cfg.format {
                    SourceFormat::Hf => Box::new(feed(FeedFormat::Hf)),
                    SourceFormat::Ccf => Box::new(feed(FeedFormat::Ccf)),
                    SourceFormat::Nino => Box::new(feed(FeedFormat::Nino)),
                    SourceFormat::Records => Box::new(RecordsFile::new(
                        &cfg.name,
                        cfg.trust.unwrap_or(DataSource::Manual),
                        cfg.paths.clone(),
                    )),
                }
            })
            .collect()
    }
}
