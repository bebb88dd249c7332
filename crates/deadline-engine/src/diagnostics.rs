//! Non-fatal problems found during a reconciliation run.
//!
//! Every entry is emitted through `tracing` when recorded and kept in memory so
//! the driver can append the whole run to a durable error log afterwards.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A source could not be read or returned nothing.
    Source,
    /// A single date field could not be normalized.
    DateParse,
    /// A record violated the id/shape contract and was skipped.
    Structure,
    /// A round or an instance was removed during cleanup.
    Cleanup,
    /// Future editions could not be projected for a family.
    Projection,
    /// An enrichment step failed for one instance.
    Enrichment,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Source => "source",
            DiagnosticKind::DateParse => "date-parse",
            DiagnosticKind::Structure => "structure",
            DiagnosticKind::Cleanup => "cleanup",
            DiagnosticKind::Projection => "projection",
            DiagnosticKind::Enrichment => "enrichment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Instance id, family or source name the problem belongs to.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.subject, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem and log it. Source and projection failures are
    /// logged at error level, everything else as a warning.
    pub fn record(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let entry = Diagnostic {
            kind,
            subject: subject.into(),
            message: message.into(),
        };
        match kind {
            DiagnosticKind::Source | DiagnosticKind::Projection => {
                tracing::error!(kind = kind.as_str(), subject = %entry.subject, "{}", entry.message)
            }
            _ => tracing::warn!(kind = kind.as_str(), subject = %entry.subject, "{}", entry.message),
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append every entry to `path`, one timestamped line each. Creates the
    /// file when missing.
    pub fn append_to(&self, path: &Path, at: DateTime<Utc>) -> Result<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let stamp = at.format("%Y-%m-%dT%H:%M:%SZ");
        for entry in &self.entries {
            writeln!(file, "{} {}", stamp, entry)?;
        }
        Ok(())
    }
}
