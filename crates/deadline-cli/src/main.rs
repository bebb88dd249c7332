//! `aideadlines` CLI — reconcile conference deadline data and export it for display.
//!
//! ## Usage
//!
//! ```sh
//! # Merge every configured source into conferences/*.yaml
//! aideadlines update
//!
//! # Re-estimate all future editions from real data only
//! aideadlines update --reestimate
//!
//! # Only re-read and clean the stored data, print the result
//! aideadlines update --offline --no-write
//!
//! # Split stored rounds into data/conferences.json and data/conferences_archive.json
//! aideadlines export
//! ```
//!
//! Log verbosity follows `AIDEADLINES_LOG` (default `info`).

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use deadline_engine::store;
use deadline_engine::{Diagnostics, Enricher, Pipeline, PipelineOptions, RankTables};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "aideadlines",
    version,
    about = "Conference deadline aggregation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./aideadlines.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory with one YAML file per conference family
    #[arg(long, global = true)]
    conference_dir: Option<PathBuf>,

    /// Directory receiving the exported JSON files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Reference time for projection and export (RFC 3339, defaults to now)
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fold all sources into the stored conference data
    Update {
        /// Skip every configured source; only reload, clean and re-project
        #[arg(long)]
        offline: bool,
        /// Drop every estimate and project all families again
        #[arg(long)]
        reestimate: bool,
        /// Print the reconciled data as JSON instead of writing it
        #[arg(long)]
        no_write: bool,
    },
    /// Split stored deadline rounds into future and past JSON files
    Export,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.conference_dir {
        config.conference_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    let now = cli.now.unwrap_or_else(Utc::now);

    match cli.command {
        Commands::Update {
            offline,
            reestimate,
            no_write,
        } => update(&config, now, offline, reestimate, no_write),
        Commands::Export => export(&config, now),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("AIDEADLINES_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn update(
    config: &Config,
    now: DateTime<Utc>,
    offline: bool,
    reestimate: bool,
    no_write: bool,
) -> Result<()> {
    let persisted = store::load_dir(&config.conference_dir).with_context(|| {
        format!("Failed to load conferences from {}", config.conference_dir.display())
    })?;

    let mut options = PipelineOptions::new(now.date_naive());
    options.projection = config.projection();
    options.force_reproject = reestimate;
    options.unite_tags = config.unite_tags;

    let mut pipeline = Pipeline::new(options);
    pipeline.load_persisted(persisted);
    if offline {
        tracing::info!("offline run, sources skipped");
    } else {
        let mut sources = config.build_sources();
        pipeline.ingest_sources(&mut sources);
    }

    let ranks = RankTables::load(
        config.ranking.h5_index.as_deref(),
        config.ranking.core.as_deref(),
    )
    .context("Failed to load rank tables")?;
    let enrichers: Vec<&dyn Enricher> = if ranks.is_empty() {
        Vec::new()
    } else {
        vec![&ranks as &dyn Enricher]
    };

    let reconciled = pipeline
        .finish(&enrichers)
        .context("Failed to re-estimate future conferences")?;

    if no_write {
        let json = serde_json::to_string_pretty(&reconciled.families)?;
        println!("{}", json);
    } else {
        let written = store::write_families(&config.conference_dir, &reconciled.families)
            .with_context(|| {
                format!("Failed to write conferences to {}", config.conference_dir.display())
            })?;
        let removed = store::remove_stale_families(&config.conference_dir, &reconciled.families)
            .with_context(|| {
                format!("Failed to clean up {}", config.conference_dir.display())
            })?;
        tracing::info!(
            files = written.len(),
            removed = removed.len(),
            "wrote conference families"
        );
    }

    report(config, &reconciled.diagnostics, now)?;
    eprintln!(
        "Reconciled {} conferences in {} families ({} problems)",
        reconciled.len(),
        reconciled.families.len(),
        reconciled.diagnostics.len()
    );
    Ok(())
}

fn export(config: &Config, now: DateTime<Utc>) -> Result<()> {
    let instances = store::load_dir(&config.conference_dir).with_context(|| {
        format!("Failed to load conferences from {}", config.conference_dir.display())
    })?;
    let mut diagnostics = Diagnostics::new();
    let partition = store::partition(&instances, now, &mut diagnostics);
    let (future, past) = store::write_partition(&config.output_dir, &partition)
        .with_context(|| format!("Failed to write {}", config.output_dir.display()))?;

    report(config, &diagnostics, now)?;
    eprintln!(
        "Exported {} upcoming rounds to {} and {} past rounds to {}",
        partition.future.len(),
        future.display(),
        partition.past.len(),
        past.display()
    );
    Ok(())
}

/// Append the run's diagnostics to the durable error log.
fn report(config: &Config, diagnostics: &Diagnostics, now: DateTime<Utc>) -> Result<()> {
    diagnostics
        .append_to(&config.error_log, now)
        .with_context(|| format!("Failed to append to {}", config.error_log.display()))
}
