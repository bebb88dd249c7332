//! Future projection -- estimates editions that have not been announced yet.
//!
//! The cadence of a family (every year, every other year, ...) is inferred from
//! the first-round deadlines of its real editions. The latest real edition is
//! then copied forward one cadence step at a time with every date shifted by
//! whole 365-day years. Leap days are ignored; the output is marked
//! approximate and is replaced as soon as any real source reports the edition.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::error::{DeadlineError, Result};
use crate::model::{family_of, year_of, ConferenceInstance, DataSource, DeadlineRound};
use crate::normalizer::{format_instant, parse_calendar_date, parse_instant};

/// Assumed length of a conference when no end date can be derived.
pub const ASSUMED_DURATION_DAYS: i64 = 5;

const DAYS_PER_YEAR: i64 = 365;

/// Bounds on how far ahead the projector speculates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Do not project editions later than `today.year() + horizon_years`.
    pub horizon_years: i32,
    /// Do not project more than this many cadence steps past the latest real edition.
    pub max_speculative_multiplier: i32,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            horizon_years: 2,
            max_speculative_multiplier: 2,
        }
    }
}

/// Infer the cadence in whole years from a set of deadlines.
///
/// Deadlines are ordered by year, consecutive gaps are rounded to whole years
/// and averaged. Halves round to even, so gaps of 2 and 3 years give 2.
/// Never returns less than 1. Returns `None` for fewer than two deadlines.
pub fn infer_cadence(deadlines: &[DateTime<Utc>]) -> Option<i32> {
    if deadlines.len() < 2 {
        return None;
    }
    let mut sorted = deadlines.to_vec();
    sorted.sort_by_key(|d| d.year());

    let deltas: Vec<f64> = sorted
        .windows(2)
        .map(|pair| {
            ((pair[1] - pair[0]).num_days() as f64 / DAYS_PER_YEAR as f64).round_ties_even()
        })
        .collect();
    let mean = deltas.iter().sum::<f64>() / deltas.len() as f64;
    Some((mean.round_ties_even() as i32).max(1))
}

/// Project future editions for one family.
///
/// `instances` are the family's reconciled editions. Returns only new
/// editions; ids already present in `instances` are never emitted. Fewer than
/// two real editions with a start date and a first-round deadline yield an
/// empty result.
///
/// # Errors
/// Returns `DeadlineError::Projection` when a date on the editions used for
/// projection cannot be read.
pub fn project(
    instances: &[ConferenceInstance],
    today: NaiveDate,
    options: &ProjectionOptions,
) -> Result<Vec<ConferenceInstance>> {
    let history: Vec<&ConferenceInstance> = instances
        .iter()
        .filter(|c| !c.is_approximate_deadline && c.conference_start_date.is_some())
        .filter(|c| c.timeline.first().is_some_and(|r| !r.deadline.is_empty()))
        .collect();
    if history.len() < 2 {
        tracing::info!(
            ids = ?instances.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            "too few past deadlines for future estimation"
        );
        return Ok(Vec::new());
    }

    let family = history
        .first()
        .and_then(|c| family_of(&c.id))
        .unwrap_or_default()
        .to_string();
    let fail = |message: String| DeadlineError::Projection {
        family: family.clone(),
        message,
    };

    let deadlines = history
        .iter()
        .map(|c| {
            let raw = &c.timeline[0].deadline;
            parse_instant(raw).ok_or_else(|| fail(format!("{}: unreadable deadline '{}'", c.id, raw)))
        })
        .collect::<Result<Vec<_>>>()?;
    let cadence = infer_cadence(&deadlines).unwrap_or(1);

    let mut dated = Vec::with_capacity(history.len());
    for conf in &history {
        let raw = conf.conference_start_date.as_deref().unwrap_or_default();
        let start = parse_calendar_date(raw)
            .ok_or_else(|| fail(format!("{}: unreadable conferenceStartDate '{}'", conf.id, raw)))?;
        dated.push((start, *conf));
    }
    let Some(&(last_start, last)) = dated.iter().max_by_key(|(start, _)| *start) else {
        return Ok(Vec::new());
    };
    let last_family = family_of(&last.id).ok_or_else(|| fail(format!("{}: id has no year", last.id)))?;
    let last_year = last_start.year();

    let known: HashSet<&str> = instances.iter().map(|c| c.id.as_str()).collect();
    let mut projected = Vec::new();
    let last_allowed = today.year().saturating_add(options.horizon_years).min(
        last_year.saturating_add(options.max_speculative_multiplier.saturating_mul(cadence)),
    );
    let mut next_year = last_year.saturating_add(cadence);
    while next_year <= last_allowed {
        let id = format!("{}{}", last_family, next_year);
        if known.contains(id.as_str()) {
            tracing::debug!(%id, "already known, not estimating");
        } else {
            let years = i64::from(next_year) - i64::from(last_year);
            let offset = Duration::try_days(DAYS_PER_YEAR * years)
                .ok_or_else(|| fail(format!("{}: cannot shift {} years ahead", last.id, years)))?;
            let conf = project_edition(last, id, last_start, next_year, offset)
                .map_err(&fail)?;
            tracing::info!(id = %conf.id, cadence, "estimated future edition");
            projected.push(conf);
        }
        let Some(following) = next_year.checked_add(cadence) else {
            break;
        };
        next_year = following;
    }

    Ok(projected)
}

fn project_edition(
    last: &ConferenceInstance,
    id: String,
    last_start: NaiveDate,
    year: i32,
    offset: Duration,
) -> std::result::Result<ConferenceInstance, String> {
    let out_of_range = || format!("{}: year {} is out of the calendar range", last.id, year);
    let start = last_start.checked_add_signed(offset).ok_or_else(out_of_range)?;
    let end = match last.conference_end_date.as_deref().and_then(parse_calendar_date) {
        Some(last_end) => last_end.checked_add_signed(offset),
        None => start.checked_add_signed(Duration::days(ASSUMED_DURATION_DAYS)),
    }
    .ok_or_else(out_of_range)?;
    let source_name = last.shortname.clone().unwrap_or_else(|| last.id.clone());

    let shift = |raw: &str| {
        let instant = parse_instant(raw)
            .ok_or_else(|| format!("{}: unreadable deadline '{}'", last.id, raw))?;
        instant
            .checked_add_signed(offset)
            .map(format_instant)
            .ok_or_else(out_of_range)
    };
    let timeline = last
        .timeline
        .iter()
        .map(|round| {
            Ok(DeadlineRound {
                deadline: shift(&round.deadline)?,
                abstract_deadline: round.abstract_deadline.as_deref().map(&shift).transpose()?,
                note: round
                    .note
                    .as_ref()
                    .map(|note| format!("From {}: {}", source_name, note)),
            })
        })
        .collect::<std::result::Result<Vec<_>, String>>()?;

    Ok(ConferenceInstance {
        id,
        title: last.title.clone(),
        shortname: last
            .shortname
            .as_deref()
            .map(|name| replace_year(name, year_of(&last.id), year)),
        tags: last.tags.clone(),
        is_approximate_deadline: true,
        conference_start_date: Some(start.format("%Y-%m-%d").to_string()),
        conference_end_date: Some(end.format("%Y-%m-%d").to_string()),
        timeline,
        data_src: Some(DataSource::Estimate),
        rating: last.rating.clone(),
        h5_index: last.h5_index,
        ..ConferenceInstance::default()
    })
}

/// Swap the edition year inside a display name: `CVPR 2025` → `CVPR 2027`.
fn replace_year(name: &str, old_year: Option<i32>, year: i32) -> String {
    if let Some(old) = old_year.map(|y| y.to_string()) {
        if name.ends_with(&old) {
            return format!("{}{}", &name[..name.len() - old.len()], year);
        }
        if name.contains(&old) {
            return name.replace(&old, &year.to_string());
        }
    }
    format!("{} {}", name, year)
}
