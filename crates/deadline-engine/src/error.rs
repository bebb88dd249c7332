//! Error types for deadline-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeadlineError {
    #[error("Invalid conference id: {0}")]
    InvalidId(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Unparsable date: {0}")]
    UnparsableDate(String),

    #[error("Source {source_name} failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    #[error("Projection failed for family {family}: {message}")]
    Projection { family: String, message: String },

    #[error("Enrichment failed: {0}")]
    Enrichment(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeadlineError>;
