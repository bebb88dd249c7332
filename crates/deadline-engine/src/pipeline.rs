//! Reconciliation pipeline -- folds records from all sources into one record
//! per edition, cleans the result and fills in projected future editions.
//!
//! The pipeline owns the identity map for the duration of one run:
//!
//! 1. [`Pipeline::load_persisted`] seeds it with previously written data.
//! 2. [`Pipeline::ingest_sources`] folds in every source, lowest trust first.
//! 3. [`Pipeline::finish`] renames legacy families, drops unreadable rounds,
//!    projects future editions per family and applies enrichment.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::enrich::{unite_family_tags, Enricher};
use crate::error::Result;
use crate::merger::merge;
use crate::model::{family_of, year_of, ConferenceInstance, DataSource};
use crate::normalizer::{normalize, parse_instant};
use crate::projector::{project, ProjectionOptions};
use crate::source::Source;

/// A family that was renamed; its editions are folded into the new name.
#[derive(Debug, Clone, Copy)]
pub struct LegacyName {
    pub old_family: &'static str,
    pub new_family: &'static str,
    pub old_display: &'static str,
    pub new_display: &'static str,
}

pub const LEGACY_NAMES: [LegacyName; 1] = [LegacyName {
    old_family: "nips",
    new_family: "neurips",
    old_display: "NIPS",
    new_display: "NeurIPS",
}];

/// Families whose sources publish both rounds as separate one-round records.
const ROUND_LABELLED_FAMILIES: [&str; 1] = ["wacv"];

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub projection: ProjectionOptions,
    /// Re-project every family from real editions only; a projection failure
    /// then aborts the run.
    pub force_reproject: bool,
    /// Unify tags across each family after enrichment.
    pub unite_tags: bool,
    /// Reference date for the projection horizon.
    pub today: NaiveDate,
}

impl PipelineOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            projection: ProjectionOptions::default(),
            force_reproject: false,
            unite_tags: true,
            today,
        }
    }
}

/// Output of a run: records grouped by family, plus everything that went wrong.
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    pub families: BTreeMap<String, BTreeMap<String, ConferenceInstance>>,
    pub diagnostics: Diagnostics,
}

impl Reconciled {
    pub fn instances(&self) -> impl Iterator<Item = &ConferenceInstance> {
        self.families.values().flat_map(|family| family.values())
    }

    pub fn get(&self, id: &str) -> Option<&ConferenceInstance> {
        self.families.get(family_of(id)?)?.get(id)
    }

    pub fn len(&self) -> usize {
        self.families.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Pipeline {
    instances: BTreeMap<String, ConferenceInstance>,
    reproject: BTreeSet<String>,
    diagnostics: Diagnostics,
    options: PipelineOptions,
}

/// Trust of a stored record. Records written before `dataSrc` existed count
/// as the weakest real source, or as estimates when flagged approximate.
fn trust_of(conf: &ConferenceInstance) -> DataSource {
    conf.data_src.unwrap_or(if conf.is_approximate_deadline {
        DataSource::Estimate
    } else {
        DataSource::NinoduarteGit
    })
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            instances: BTreeMap::new(),
            reproject: BTreeSet::new(),
            diagnostics: Diagnostics::new(),
            options,
        }
    }

    pub fn get(&self, id: &str) -> Option<&ConferenceInstance> {
        self.instances.get(id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Families whose projections will be rebuilt from real editions.
    pub fn reprojected_families(&self) -> impl Iterator<Item = &str> {
        self.reproject.iter().map(String::as_str)
    }

    /// Seed the identity map with previously persisted records. Each record is
    /// normalized; when an id occurs twice the first record is kept. Records
    /// without `dataSrc` get their inferred trust written back, and the
    /// approximate flag is set exactly for estimates.
    pub fn load_persisted(&mut self, records: impl IntoIterator<Item = ConferenceInstance>) {
        for record in records {
            let Some(mut conf) = self.admit(record) else {
                continue;
            };
            if self.instances.contains_key(&conf.id) {
                tracing::debug!(id = %conf.id, "duplicate persisted record ignored");
                continue;
            }
            if normalize(&mut conf, &mut self.diagnostics).is_ok() {
                let trust = trust_of(&conf);
                conf.data_src = Some(trust);
                conf.is_approximate_deadline = trust == DataSource::Estimate;
                self.instances.insert(conf.id.clone(), conf);
            }
        }
        tracing::info!(count = self.instances.len(), "loaded persisted conference instances");
    }

    /// Fetch every source and ingest it, lowest trust first.
    pub fn ingest_sources(&mut self, sources: &mut [Box<dyn Source>]) {
        sources.sort_by_key(|source| source.trust());
        for source in sources.iter_mut() {
            self.ingest_source(source.as_mut());
        }
    }

    /// Fetch one source and ingest its records. A failing or empty source is
    /// recorded and contributes nothing. Returns the number of records fetched.
    pub fn ingest_source(&mut self, source: &mut dyn Source) -> usize {
        let name = source.name().to_string();
        let trust = source.trust();
        tracing::info!(source = %name, trust = %trust, "loading source");
        match source.fetch() {
            Ok(records) if records.is_empty() => {
                self.diagnostics
                    .record(DiagnosticKind::Source, name, "no conferences found");
                0
            }
            Ok(records) => {
                let count = records.len();
                tracing::info!(source = %name, count, "fetched records");
                self.ingest(trust, records);
                count
            }
            Err(e) => {
                self.diagnostics
                    .record(DiagnosticKind::Source, name, e.to_string());
                0
            }
        }
    }

    /// Fold candidate records reported by a source of the given trust.
    pub fn ingest(&mut self, trust: DataSource, records: Vec<ConferenceInstance>) {
        for record in records {
            let Some(mut candidate) = self.admit(record) else {
                continue;
            };
            if normalize(&mut candidate, &mut self.diagnostics).is_err() {
                continue;
            }
            candidate.is_approximate_deadline = trust == DataSource::Estimate;
            if candidate.timeline.len() == 1
                && candidate
                    .family()
                    .is_some_and(|family| ROUND_LABELLED_FAMILIES.contains(&family))
            {
                self.label_single_round(&mut candidate);
            }
            self.fold(trust, candidate);
        }
    }

    /// Structural check. Blank records are dropped quietly; records without a
    /// usable id are reported and dropped.
    fn admit(&mut self, record: ConferenceInstance) -> Option<ConferenceInstance> {
        if record.id.is_empty() {
            if !record.is_blank() {
                self.diagnostics.record(
                    DiagnosticKind::Structure,
                    record.shortname.as_deref().unwrap_or("<unnamed>"),
                    "record has data but no id",
                );
            }
            return None;
        }
        if year_of(&record.id).is_none() {
            self.diagnostics.record(
                DiagnosticKind::Structure,
                &record.id,
                "id does not end in a four-digit year",
            );
            return None;
        }
        Some(record)
    }

    /// Sources that report a one-round edition of a two-round conference:
    /// deadlines up to August are round 1, later ones round 2.
    fn label_single_round(&mut self, candidate: &mut ConferenceInstance) {
        let round = &mut candidate.timeline[0];
        let number = match parse_instant(&round.deadline) {
            Some(deadline) if deadline.month() <= 8 => 1,
            Some(_) => 2,
            None => {
                self.diagnostics.record(
                    DiagnosticKind::DateParse,
                    &candidate.id,
                    "cannot infer round from unreadable deadline, assuming round 2",
                );
                2
            }
        };
        round.note = Some(format!("Round {}", number));
    }

    fn fold(&mut self, trust: DataSource, mut candidate: ConferenceInstance) {
        let id = candidate.id.clone();
        let family = candidate.family().unwrap_or_default().to_string();

        let folded = match self.instances.get(&id) {
            None => {
                tracing::info!(%id, source = %trust, "new conference");
                candidate.data_src = Some(trust);
                self.reproject.insert(family);
                candidate
            }
            Some(existing) if trust_of(existing) <= trust => {
                let mut merged = if trust_of(existing) == DataSource::Estimate {
                    tracing::info!(%id, source = %trust, "first data for estimated conference");
                    self.reproject.insert(family);
                    candidate
                } else {
                    merge(&candidate, existing)
                };
                merged.data_src = Some(trust);
                merged
            }
            Some(existing) => {
                let mut merged = merge(existing, &candidate);
                merged.data_src = existing.data_src;
                merged
            }
        };
        self.instances.insert(id, folded);
    }

    /// Run the post-ingestion passes and hand out the reconciled records.
    ///
    /// # Errors
    /// Only fails when `force_reproject` is set and projecting a family fails;
    /// otherwise projection failures are recorded and the family keeps its
    /// records as they are.
    pub fn finish(mut self, enrichers: &[&dyn Enricher]) -> Result<Reconciled> {
        self.fold_legacy_names();
        self.drop_unreadable_rounds();

        let mut grouped: BTreeMap<String, BTreeMap<String, ConferenceInstance>> = BTreeMap::new();
        for (id, conf) in std::mem::take(&mut self.instances) {
            let family = family_of(&id).unwrap_or_default().to_string();
            grouped.entry(family).or_default().insert(id, conf);
        }

        let mut families = BTreeMap::new();
        for (family, mut members) in grouped {
            let reproject = self.options.force_reproject || self.reproject.contains(&family);
            if reproject {
                members.retain(|_, conf| !conf.is_approximate_deadline);
            }
            self.add_projections(&family, &mut members)?;

            for conf in members.values_mut() {
                for enricher in enrichers {
                    match enricher.enrich(conf) {
                        Ok(enriched) => *conf = enriched,
                        Err(e) => self.diagnostics.record(
                            DiagnosticKind::Enrichment,
                            &conf.id,
                            format!("{}: {}", enricher.name(), e),
                        ),
                    }
                }
            }
            if self.options.unite_tags {
                unite_family_tags(members.values_mut());
            }
            tracing::debug!(%family, ids = ?members.keys().collect::<Vec<_>>(), "family reconciled");
            families.insert(family, members);
        }

        Ok(Reconciled {
            families,
            diagnostics: self.diagnostics,
        })
    }

    fn add_projections(
        &mut self,
        family: &str,
        members: &mut BTreeMap<String, ConferenceInstance>,
    ) -> Result<()> {
        let basis: Vec<ConferenceInstance> = members.values().cloned().collect();
        match project(&basis, self.options.today, &self.options.projection) {
            Ok(projected) => {
                for conf in projected {
                    members.entry(conf.id.clone()).or_insert(conf);
                }
                Ok(())
            }
            Err(e) if self.options.force_reproject => Err(e),
            Err(e) => {
                self.diagnostics
                    .record(DiagnosticKind::Projection, family, e.to_string());
                Ok(())
            }
        }
    }

    fn fold_legacy_names(&mut self) {
        for legacy in LEGACY_NAMES {
            let old_ids: Vec<String> = self
                .instances
                .keys()
                .filter(|id| family_of(id) == Some(legacy.old_family))
                .cloned()
                .collect();
            for old_id in old_ids {
                let Some(mut conf) = self.instances.remove(&old_id) else {
                    continue;
                };
                let new_id = format!("{}{}", legacy.new_family, &old_id[old_id.len() - 4..]);
                conf.id = new_id.clone();
                conf.shortname = conf
                    .shortname
                    .map(|name| name.replace(legacy.old_display, legacy.new_display));

                let folded = match self.instances.get(&new_id) {
                    Some(existing) => {
                        let mut merged = merge(existing, &conf);
                        merged.data_src = existing.data_src;
                        merged
                    }
                    None => conf,
                };
                if self.reproject.remove(legacy.old_family) {
                    self.reproject.insert(legacy.new_family.to_string());
                }
                tracing::info!(%old_id, %new_id, "folded legacy family name");
                self.instances.insert(new_id, folded);
            }
        }
    }

    fn drop_unreadable_rounds(&mut self) {
        let diagnostics = &mut self.diagnostics;
        self.instances.retain(|id, conf| {
            conf.timeline.retain(|round| {
                let readable = parse_instant(&round.deadline).is_some();
                if !readable {
                    diagnostics.record(
                        DiagnosticKind::Cleanup,
                        id.as_str(),
                        format!("removed round with unreadable deadline '{}'", round.deadline),
                    );
                }
                readable
            });
            if conf.timeline.is_empty() {
                diagnostics.record(
                    DiagnosticKind::Cleanup,
                    id.as_str(),
                    "removed conference without a readable deadline",
                );
            }
            !conf.timeline.is_empty()
        });
    }
}
