//! Conference records as they are persisted and exchanged with sources.
//!
//! Field names serialize in camelCase so existing YAML data (`dataSrc`,
//! `isApproximateDeadline`, `h5Index`, ...) loads without translation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DeadlineError;

/// Provenance of a record, ordered from least to most trusted.
///
/// The derived `Ord` follows declaration order, so `a < b` means `b` wins a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataSource {
    /// Produced by the future projector.
    #[default]
    Estimate,
    NinoduarteGit,
    CcfDeadlines,
    HfRepo,
    OffWebsite,
    Manual,
}

impl DataSource {
    pub const ALL: [DataSource; 6] = [
        DataSource::Estimate,
        DataSource::NinoduarteGit,
        DataSource::CcfDeadlines,
        DataSource::HfRepo,
        DataSource::OffWebsite,
        DataSource::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Estimate => "estimate",
            DataSource::NinoduarteGit => "ninoduarte-git",
            DataSource::CcfDeadlines => "ccf-deadlines",
            DataSource::HfRepo => "hf-repo",
            DataSource::OffWebsite => "off-website",
            DataSource::Manual => "manual",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = DeadlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataSource::ALL
            .into_iter()
            .find(|src| src.as_str() == s)
            .ok_or_else(|| DeadlineError::MalformedRecord(format!("unknown dataSrc '{}'", s)))
    }
}

/// One submission cycle within a conference edition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineRound {
    #[serde(default)]
    pub deadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstract_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DeadlineRound {
    pub fn new(deadline: impl Into<String>) -> Self {
        Self {
            deadline: deadline.into(),
            ..Self::default()
        }
    }
}

/// One concrete edition of a conference, e.g. `cvpr2026`.
///
/// Sources hand these over partially filled; every optional field is
/// `None` when the source did not report it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceInstance {
    #[serde(default)]
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
    #[serde(default)]
    pub timeline: Vec<DeadlineRound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_src: Option<DataSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(rename = "h5Index", default, skip_serializing_if = "Option::is_none")]
    pub h5_index: Option<u32>,
}

impl ConferenceInstance {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Edition year taken from the trailing four digits of the id.
    pub fn year(&self) -> Option<i32> {
        year_of(&self.id)
    }

    /// The id with its trailing year removed.
    pub fn family(&self) -> Option<&str> {
        family_of(&self.id)
    }

    /// True when nothing but defaults is set. Sources emit these for
    /// editions they have no data for.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// Split `cvpr2026` into its trailing year, if the last four characters are digits.
pub fn year_of(id: &str) -> Option<i32> {
    let split = id.len().checked_sub(4)?;
    let tail = id.get(split..)?;
    if tail.bytes().all(|b| b.is_ascii_digit()) {
        tail.parse().ok()
    } else {
        None
    }
}

/// Family key of an id: `cvpr2026` → `cvpr`.
pub fn family_of(id: &str) -> Option<&str> {
    year_of(id)?;
    id.get(..id.len() - 4)
}
