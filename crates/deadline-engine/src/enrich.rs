//! Enrichment steps applied to reconciled records: ranking lookups and tag
//! unification.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DeadlineError, Result};
use crate::model::{family_of, ConferenceInstance};

static CORE_RANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-H]\*?$").expect("valid rank regex"));

/// Topic labels used by the feeds, mapped onto the short tags the data set uses.
pub(crate) const TAG_SYNONYMS: [(&str, &str); 7] = [
    ("machine-learning", "ML"),
    ("computer-vision", "CV"),
    ("natural-language-processing", "NLP"),
    ("human-computer-interaction", "HCI"),
    ("robotics", "RO"),
    ("data-mining", "DM"),
    ("signal-processing", "SP"),
];

/// A per-instance enrichment step. A failure leaves the instance as it was.
pub trait Enricher {
    fn name(&self) -> &str;
    fn enrich(&self, instance: &ConferenceInstance) -> Result<ConferenceInstance>;
}

/// Ranking tables keyed by family: Google Scholar h5-index and CORE rank.
#[derive(Debug, Clone, Default)]
pub struct RankTables {
    h5_index: BTreeMap<String, u32>,
    core: BTreeMap<String, String>,
}

impl RankTables {
    /// Build from in-memory tables. CORE entries that are not a rank letter
    /// (`A*`, `A`, `B`, ...) are dropped.
    pub fn new(h5_index: BTreeMap<String, u32>, core: BTreeMap<String, String>) -> Self {
        let core = core
            .into_iter()
            .filter(|(family, rank)| {
                let valid = CORE_RANK.is_match(rank);
                if !valid {
                    tracing::warn!(%family, %rank, "ignoring unknown CORE rank");
                }
                valid
            })
            .collect();
        Self { h5_index, core }
    }

    /// Load tables from YAML mappings. A missing path yields an empty table.
    pub fn load(h5_index: Option<&Path>, core: Option<&Path>) -> Result<Self> {
        let h5_index = match h5_index {
            Some(path) => read_table(path)?,
            None => BTreeMap::new(),
        };
        let core = match core {
            Some(path) => read_table(path)?,
            None => BTreeMap::new(),
        };
        tracing::info!(h5 = h5_index.len(), core = core.len(), "loaded rank tables");
        Ok(Self::new(h5_index, core))
    }

    pub fn is_empty(&self) -> bool {
        self.h5_index.is_empty() && self.core.is_empty()
    }
}

fn read_table<V: serde::de::DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, V>> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let table: Option<BTreeMap<String, V>> = serde_yaml::from_str(&text)?;
    Ok(table.unwrap_or_default())
}

/// Family key used by the rank tables: the id without its year and without a
/// round suffix (`wacvR12025` → `wacv`).
pub fn rank_key(id: &str) -> Option<&str> {
    let family = family_of(id)?;
    let bytes = family.as_bytes();
    match bytes {
        [.., b'R', digit] if digit.is_ascii_digit() => family.get(..family.len() - 2),
        _ => Some(family),
    }
}

impl Enricher for RankTables {
    fn name(&self) -> &str {
        "rank-tables"
    }

    fn enrich(&self, instance: &ConferenceInstance) -> Result<ConferenceInstance> {
        let key = rank_key(&instance.id).ok_or_else(|| DeadlineError::InvalidId(instance.id.clone()))?;
        let mut out = instance.clone();
        if let Some(h5) = self.h5_index.get(key) {
            out.h5_index = Some(*h5);
        }
        if let Some(rank) = self.core.get(key) {
            out.rating = Some(rank.clone());
        }
        Ok(out)
    }
}

/// Canonical spelling of a topic tag.
pub fn canonical_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    TAG_SYNONYMS
        .iter()
        .find(|(long, _)| long.eq_ignore_ascii_case(trimmed))
        .map(|(_, short)| short.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Give every edition of a family the same tag set: the sorted union of all
/// its editions' tags, in canonical spelling.
pub fn unite_family_tags<'a>(family: impl IntoIterator<Item = &'a mut ConferenceInstance>) {
    let members: Vec<&mut ConferenceInstance> = family.into_iter().collect();
    let united: BTreeSet<String> = members
        .iter()
        .flat_map(|c| c.tags.iter())
        .map(|t| canonical_tag(t))
        .filter(|t| !t.is_empty())
        .collect();
    let united: Vec<String> = united.into_iter().collect();
    for conf in members {
        conf.tags.clone_from(&united);
    }
}
