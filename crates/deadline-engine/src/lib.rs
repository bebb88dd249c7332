//! # deadline-engine
//!
//! Reconciles conference deadline records from several sources of differing
//! trust into one record per conference edition, and estimates editions that
//! have not been announced yet.
//!
//! All deadlines leave the engine as UTC instants (`2025-11-15T07:59:00Z`),
//! whatever free-form text and timezone the source used.
//!
//! ## Modules
//!
//! - [`model`] — conference editions, deadline rounds and the trust ordering
//! - [`normalizer`] — free-form dates → canonical UTC strings
//! - [`merger`] — precedence merge of two records for the same edition
//! - [`projector`] — cadence inference and future-edition estimation
//! - [`pipeline`] — ingestion, cleanup, projection and enrichment of a run
//! - [`source`] / [`feeds`] — record providers and third-party feed adapters
//! - [`enrich`] — ranking tables and tag unification
//! - [`store`] — per-family YAML files and the display partition
//! - [`diagnostics`] — non-fatal problems collected during a run
//! - [`error`] — Error types

pub mod diagnostics;
pub mod enrich;
pub mod error;
pub mod feeds;
pub mod merger;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod projector;
pub mod source;
pub mod store;
pub mod timetext;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use enrich::{Enricher, RankTables};
pub use error::DeadlineError;
pub use merger::merge;
pub use model::{ConferenceInstance, DataSource, DeadlineRound};
pub use normalizer::{normalize, normalize_deadline};
pub use pipeline::{Pipeline, PipelineOptions, Reconciled};
pub use projector::{infer_cadence, project, ProjectionOptions};
pub use source::{RecordsFile, Source, StaticSource};
