//! Time normalization -- rewrites the date-bearing fields of a record into
//! canonical form.
//!
//! Conference dates become `YYYY-MM-DD`; every deadline becomes a UTC instant
//! written as `YYYY-MM-DDTHH:MM:SSZ`. The edition year comes from the id, so
//! sources may omit it ("Dec 10, 23:59 AoE" on `neurips2025`). A field that
//! cannot be read is left exactly as it was and reported; running the
//! normalizer over its own output changes nothing.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{DeadlineError, Result};
use crate::model::{year_of, ConferenceInstance};
use crate::timetext::{self, month_abbrev};

/// "June 10", "Friday the 14th" -- a day without a year.
static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z, ]*\d?\d[a-z]*$").expect("valid month-day regex"));

/// "Dec 10, 23:59 AoE" -- split into the day part and the time-and-zone part.
static MONTH_DAY_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z, ]*\d?\d[a-z]*)(,? *\d\d?:\d\d[A-Za-z0-9 ,():+\-]*)$")
        .expect("valid month-day-time regex")
});

/// Ad-hoc zone spellings rewritten before reading, applied in order.
const ZONE_SPELLINGS: [(&str, &str); 4] = [
    ("(Anywhere on Earth)", "AoE"),
    ("Anywhere on Earth", "AoE"),
    ("AoE", "UTC-12"),
    ("Pacific Time", "PT"),
];

/// Stored timezone names that need a different spelling to be understood.
const TIMEZONE_ALIASES: [(&str, &str); 1] = [("Russia/Moscow", "GMT+3")];

/// Normalize all date-bearing fields of `instance` in place.
///
/// # Errors
/// Returns `DeadlineError::InvalidId` when the id does not end in a four-digit
/// year. Unreadable individual fields are not errors; they are recorded in
/// `diagnostics` and left untouched.
pub fn normalize(instance: &mut ConferenceInstance, diagnostics: &mut Diagnostics) -> Result<()> {
    let year = year_of(&instance.id).ok_or_else(|| DeadlineError::InvalidId(instance.id.clone()))?;
    let timezone = instance.timezone.as_deref().map(canonical_timezone);

    if let Some(raw) = instance.conference_start_date.as_mut() {
        match normalize_calendar_date(raw, year, None) {
            Some(date) => *raw = date,
            None => diagnostics.record(
                DiagnosticKind::DateParse,
                &instance.id,
                format!("could not read conferenceStartDate '{}'", raw),
            ),
        }
    }

    let start_month = instance
        .conference_start_date
        .as_deref()
        .and_then(parse_calendar_date)
        .map(|d| d.month());
    if let Some(raw) = instance.conference_end_date.as_mut() {
        match normalize_calendar_date(raw, year, start_month) {
            Some(date) => *raw = date,
            None => diagnostics.record(
                DiagnosticKind::DateParse,
                &instance.id,
                format!("could not read conferenceEndDate '{}'", raw),
            ),
        }
    }

    for round in &mut instance.timeline {
        let fields = [
            ("deadline", Some(&mut round.deadline)),
            ("abstractDeadline", round.abstract_deadline.as_mut()),
        ];
        for (name, field) in fields {
            let Some(raw) = field else { continue };
            match normalize_deadline(raw, year, timezone.as_deref()) {
                Some(instant) => *raw = instant,
                None => diagnostics.record(
                    DiagnosticKind::DateParse,
                    &instance.id,
                    format!("could not read {} '{}'", name, raw),
                ),
            }
        }
    }

    Ok(())
}

/// Canonical form of a stored timezone name.
pub fn canonical_timezone(timezone: &str) -> String {
    TIMEZONE_ALIASES
        .iter()
        .fold(timezone.trim().to_string(), |tz, (alias, canonical)| tz.replace(alias, canonical))
}

/// Read a conference date, filling in the edition year where missing.
///
/// `start_month` enables the end-date rule: "Monday the 14th" on an end date
/// borrows the month of the already resolved start date.
pub fn normalize_calendar_date(raw: &str, year: i32, start_month: Option<u32>) -> Option<String> {
    let mut text = raw.trim().to_string();
    if MONTH_DAY.is_match(&text) {
        text = format!("{}, {}", text, year);
    }
    if let Some(month) = start_month.and_then(month_abbrev) {
        let mentions_month = (1..=12).filter_map(month_abbrev).any(|m| text.contains(m));
        if text.contains(" the ") && !mentions_month {
            text = text.replace(" the ", &format!(" {} ", month));
        }
    }
    let parsed = timetext::parse(&rewrite_zone_spellings(&text))?;
    Some(parsed.date.format("%Y-%m-%d").to_string())
}

/// Read a deadline and render it as a UTC instant.
///
/// When the text names no zone and `timezone` is given, the text is read
/// again with the timezone appended; if that fails the zone-less reading
/// (taken as UTC) is kept.
pub fn normalize_deadline(raw: &str, year: i32, timezone: Option<&str>) -> Option<String> {
    let mut text = raw.trim().to_string();
    if let Some(caps) = MONTH_DAY_TIME.captures(&text) {
        text = format!("{} {}{}", &caps[1], year, &caps[2]);
    }

    let mut parsed = timetext::parse(&rewrite_zone_spellings(&text))?;
    if parsed.zone.is_none() {
        if let Some(tz) = timezone {
            let zoned = rewrite_zone_spellings(&format!("{} {}", text, tz));
            if let Some(reparsed) = timetext::parse(&zoned).filter(|p| p.zone.is_some()) {
                parsed = reparsed;
            }
        }
    }
    parsed.to_utc().map(format_instant)
}

/// Read any deadline text as a UTC instant, without year or timezone context.
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    timetext::parse(&rewrite_zone_spellings(text))?.to_utc()
}

/// Read a calendar date such as `2025-06-10` or `June 10, 2025`.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    timetext::parse(&rewrite_zone_spellings(text)).map(|t| t.date)
}

/// `2025-12-11T11:59:00Z`
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn rewrite_zone_spellings(text: &str) -> String {
    ZONE_SPELLINGS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}
