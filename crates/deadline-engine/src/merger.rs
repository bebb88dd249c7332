//! Field-level merge of two records describing the same edition.

use crate::model::ConferenceInstance;

/// Merge `master` over `slave`.
///
/// Starts from a copy of `slave` and replaces every field `master` has set.
/// `tags` are never replaced: the result carries the sorted union of both tag
/// sets. A non-empty `timeline` on `master` replaces the slave's timeline as a
/// whole. `dataSrc` keeps the slave's value; the caller decides provenance.
pub fn merge(master: &ConferenceInstance, slave: &ConferenceInstance) -> ConferenceInstance {
    let mut out = slave.clone();

    if !master.id.is_empty() {
        out.id = master.id.clone();
    }
    overwrite(&mut out.title, &master.title);
    overwrite(&mut out.shortname, &master.shortname);
    overwrite(&mut out.website, &master.website);
    overwrite(&mut out.location, &master.location);
    overwrite(&mut out.conference_start_date, &master.conference_start_date);
    overwrite(&mut out.conference_end_date, &master.conference_end_date);
    overwrite(&mut out.timezone, &master.timezone);
    overwrite(&mut out.rating, &master.rating);
    overwrite(&mut out.h5_index, &master.h5_index);
    out.is_approximate_deadline = master.is_approximate_deadline;
    if !master.timeline.is_empty() {
        out.timeline = master.timeline.clone();
    }
    out.tags = union_tags(&master.tags, &slave.tags);

    out
}

/// Sorted, de-duplicated union of two tag lists.
pub fn union_tags(a: &[String], b: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = a.iter().chain(b).cloned().collect();
    tags.sort();
    tags.dedup();
    tags
}

fn overwrite<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}
