//! Reader for the date strings conference sources publish.
//!
//! Covers what the feeds and call-for-papers pages actually contain:
//! ISO-8601 with or without offset, `Month Day, Year [HH:MM[:SS]] [am|pm] [zone]`,
//! `Day Month Year`, `M/D/YYYY`, weekday prefixes, ordinal suffixes, and a
//! trailing timezone given as an abbreviation, a `UTC±H` offset or an IANA name.
//! Anything else is rejected rather than guessed.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;

static ISO_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[Tt ](\d{1,2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?)?\s*(.*)$",
    )
    .expect("valid ISO regex")
});

static PREFIXED_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:UTC|GMT|UT)\s*([+-])(\d{1,2})(?::?(\d{2}))?$").expect("valid offset regex")
});

static BARE_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-])(\d{2}):?(\d{2})$").expect("valid offset regex"));

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?(am|pm|a\.m\.|p\.m\.)?$").expect("valid clock regex")
});

static SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})/(\d{1,2})/(\d{1,4})$").expect("valid date regex"));

/// A timezone recovered from date text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Fixed(FixedOffset),
    Named(Tz),
}

/// Result of reading one date string.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeText {
    pub date: NaiveDate,
    /// `None` when the text carried no time of day.
    pub time: Option<NaiveTime>,
    /// `None` when the text carried no timezone.
    pub zone: Option<Zone>,
}

impl TimeText {
    pub fn naive(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }

    /// The instant in UTC. Zone-less text is read as UTC.
    ///
    /// Local times skipped by a DST transition yield `None`; ambiguous ones
    /// resolve to the earlier instant.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let naive = self.naive();
        match self.zone {
            None => Some(Utc.from_utc_datetime(&naive)),
            Some(Zone::Fixed(offset)) => offset
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Some(Zone::Named(tz)) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Read a date string. Returns `None` for anything the rules do not cover,
/// including text without a year, month and day.
pub fn parse(text: &str) -> Option<TimeText> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    // ISO text with trailing words the zone reader rejects (`11:59 PM`) gets
    // a second chance through the word reader.
    ISO_DATETIME
        .captures(text)
        .and_then(|caps| parse_iso(&caps))
        .or_else(|| parse_words(text))
}

fn parse_iso(caps: &regex::Captures<'_>) -> Option<TimeText> {
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, num(2)?, num(3)?)?;
    let time = match num(4) {
        Some(hour) => Some(NaiveTime::from_hms_opt(hour, num(5)?, num(6).unwrap_or(0))?),
        None => None,
    };
    let rest = caps.get(7).map(|m| m.as_str().trim()).unwrap_or("");
    let mut zone = None;
    for word in rest.split_whitespace() {
        zone = Some(parse_zone(word)?);
    }
    Some(TimeText { date, time, zone })
}

#[derive(Default)]
struct Fields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    time: Option<(u32, u32, u32)>,
    meridiem: Option<bool>,
    zone: Option<Zone>,
}

fn parse_words(text: &str) -> Option<TimeText> {
    let mut fields = Fields::default();

    for raw in text.split(|c: char| c.is_whitespace() || c == ',') {
        let token = raw.trim_matches(|c| c == '(' || c == ')');
        if token.is_empty() || token == "-" || token == "@" {
            continue;
        }
        read_token(token, &mut fields)?;
    }

    let date = NaiveDate::from_ymd_opt(fields.year?, fields.month?, fields.day?)?;
    let time = match fields.time {
        Some((mut hour, minute, second)) => {
            match fields.meridiem {
                Some(true) if hour < 12 => hour += 12,
                Some(false) if hour == 12 => hour = 0,
                _ => {}
            }
            Some(NaiveTime::from_hms_opt(hour, minute, second)?)
        }
        None => None,
    };
    Some(TimeText {
        date,
        time,
        zone: fields.zone,
    })
}

fn read_token(token: &str, fields: &mut Fields) -> Option<()> {
    let lower = token.to_ascii_lowercase();
    let word = lower.trim_end_matches('.');

    if is_filler(word) || weekday(word) {
        return Some(());
    }
    if let Some(month) = month_number(word) {
        return set_once(&mut fields.month, month);
    }
    match word {
        "am" | "a.m" => {
            fields.meridiem = Some(false);
            return Some(());
        }
        "pm" | "p.m" => {
            fields.meridiem = Some(true);
            return Some(());
        }
        _ => {}
    }
    if let Some(caps) = CLOCK.captures(&lower) {
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        fields.time = Some((num(1)?, num(2)?, num(3).unwrap_or(0)));
        if let Some(suffix) = caps.get(4) {
            fields.meridiem = Some(suffix.as_str().starts_with('p'));
        }
        return Some(());
    }
    if let Some(caps) = SLASH_DATE.captures(word) {
        let parts: Vec<&str> = (1..=3).filter_map(|i| caps.get(i).map(|m| m.as_str())).collect();
        // YYYY/MM/DD, otherwise US-style M/D/YYYY.
        let (y, m, d) = if parts[0].len() == 4 {
            (parts[0], parts[1], parts[2])
        } else {
            (parts[2], parts[0], parts[1])
        };
        set_once(&mut fields.year, y.parse().ok()?)?;
        set_once(&mut fields.month, m.parse().ok()?)?;
        return set_once(&mut fields.day, d.parse().ok()?);
    }
    if let Some(caps) = ISO_DATETIME.captures(word) {
        let iso = parse_iso(&caps)?;
        set_once(&mut fields.year, iso.date.year())?;
        set_once(&mut fields.month, iso.date.month())?;
        set_once(&mut fields.day, iso.date.day())?;
        return Some(());
    }
    if let Some(number) = ordinal_or_number(word) {
        let (value, digits) = number;
        if digits == 4 {
            return set_once(&mut fields.year, value as i32);
        }
        if digits <= 2 {
            return set_once(&mut fields.day, value);
        }
        return None;
    }
    // Later zone words override earlier ones ("UTC-12 (AoE)" after alias rewriting).
    fields.zone = Some(parse_zone(token)?);
    Some(())
}

fn set_once<T: PartialEq>(slot: &mut Option<T>, value: T) -> Option<()> {
    match slot {
        Some(existing) if *existing != value => None,
        _ => {
            *slot = Some(value);
            Some(())
        }
    }
}

fn is_filler(word: &str) -> bool {
    matches!(word, "the" | "of" | "at" | "on" | "by" | "until" | "before" | "due")
}

fn weekday(word: &str) -> bool {
    matches!(
        word,
        "mon" | "monday"
            | "tue" | "tues" | "tuesday"
            | "wed" | "wednesday"
            | "thu" | "thur" | "thurs" | "thursday"
            | "fri" | "friday"
            | "sat" | "saturday"
            | "sun" | "sunday"
    )
}

/// Month number for an English month name or abbreviation.
pub fn month_number(word: &str) -> Option<u32> {
    let month = match word {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// Three-letter English abbreviation for a month number (1-based).
pub fn month_abbrev(month: u32) -> Option<&'static str> {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// `14`, `14th`, `1st`, `22nd`, `3rd` → (value, digit count).
fn ordinal_or_number(word: &str) -> Option<(u32, usize)> {
    let digits = word.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix = &word[digits.len()..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !matches!(suffix, "" | "st" | "nd" | "rd" | "th") {
        return None;
    }
    Some((digits.parse().ok()?, digits.len()))
}

/// Resolve a timezone word: `UTC`, `UTC-12`, `GMT+3`, `+05:30`, `PST`,
/// `America/Los_Angeles`, optionally in parentheses.
pub fn parse_zone(word: &str) -> Option<Zone> {
    let word = word.trim().trim_matches(|c| c == '(' || c == ')').trim();
    let upper = word.to_ascii_uppercase();

    if matches!(upper.as_str(), "Z" | "UTC" | "GMT" | "UT") {
        return fixed_hours(0, 0);
    }
    if let Some(caps) = PREFIXED_OFFSET
        .captures(&upper)
        .or_else(|| BARE_OFFSET.captures(&upper))
    {
        let sign = if caps.get(1)?.as_str() == "-" { -1 } else { 1 };
        let hours: i32 = caps.get(2)?.as_str().parse().ok()?;
        let minutes: i32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if hours > 14 || minutes >= 60 {
            return None;
        }
        return fixed_hours(sign * hours, sign * minutes);
    }
    if let Some(zone) = abbreviation(&upper) {
        return Some(zone);
    }
    word.parse::<Tz>().ok().map(Zone::Named)
}

fn abbreviation(upper: &str) -> Option<Zone> {
    let named = |tz: Tz| Some(Zone::Named(tz));
    match upper {
        "AOE" => fixed_hours(-12, 0),
        "PT" => named(chrono_tz::America::Los_Angeles),
        "PST" => fixed_hours(-8, 0),
        "PDT" => fixed_hours(-7, 0),
        "MT" => named(chrono_tz::America::Denver),
        "MST" => fixed_hours(-7, 0),
        "MDT" => fixed_hours(-6, 0),
        "CT" => named(chrono_tz::America::Chicago),
        "CST" => fixed_hours(-6, 0),
        "CDT" => fixed_hours(-5, 0),
        "ET" => named(chrono_tz::America::New_York),
        "EST" => fixed_hours(-5, 0),
        "EDT" => fixed_hours(-4, 0),
        "WET" => fixed_hours(0, 0),
        "BST" | "CET" => fixed_hours(1, 0),
        "CEST" | "EET" => fixed_hours(2, 0),
        "EEST" | "MSK" => fixed_hours(3, 0),
        "IST" => fixed_hours(5, 30),
        "SGT" | "HKT" => fixed_hours(8, 0),
        "JST" | "KST" => fixed_hours(9, 0),
        "AEST" => fixed_hours(10, 0),
        "AEDT" => fixed_hours(11, 0),
        "NZST" => fixed_hours(12, 0),
        "NZDT" => fixed_hours(13, 0),
        _ => None,
    }
}

fn fixed_hours(hours: i32, minutes: i32) -> Option<Zone> {
    FixedOffset::east_opt(hours * 3600 + minutes * 60).map(Zone::Fixed)
}
