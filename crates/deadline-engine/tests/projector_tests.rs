//! Tests for cadence inference and future-edition projection.

use chrono::{NaiveDate, TimeZone, Utc};
use deadline_engine::projector::ASSUMED_DURATION_DAYS;
use deadline_engine::{
    infer_cadence, project, ConferenceInstance, DataSource, DeadlineError, DeadlineRound,
    ProjectionOptions,
};

fn edition(id: &str, shortname: &str, start: &str, end: Option<&str>, deadline: &str) -> ConferenceInstance {
    let mut conf = ConferenceInstance::new(id);
    conf.shortname = Some(shortname.to_string());
    conf.tags = vec!["ML".to_string()];
    conf.conference_start_date = Some(start.to_string());
    conf.conference_end_date = end.map(str::to_string);
    conf.timeline = vec![DeadlineRound::new(deadline)];
    conf.data_src = Some(DataSource::HfRepo);
    conf
}

fn icml() -> Vec<ConferenceInstance> {
    let mut icml2024 = edition(
        "icml2024",
        "ICML 2024",
        "2024-07-21",
        Some("2024-07-27"),
        "2024-02-01T11:59:59Z",
    );
    icml2024.timeline[0].note = Some("Main track".to_string());
    icml2024.rating = Some("A*".to_string());
    vec![
        edition("icml2023", "ICML 2023", "2023-07-23", Some("2023-07-29"), "2023-01-26T20:00:00Z"),
        icml2024,
    ]
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ---------------------------------------------------------------------------
// Cadence
// ---------------------------------------------------------------------------

#[test]
fn yearly_cadence() {
    let deadlines = [
        Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2022, 3, 4, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2023, 2, 27, 0, 0, 0).unwrap(),
    ];
    assert_eq!(infer_cadence(&deadlines), Some(1));
}

#[test]
fn biennial_cadence() {
    let deadlines = [
        Utc.with_ymd_and_hms(2023, 3, 8, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2021, 3, 5, 0, 0, 0).unwrap(),
    ];
    assert_eq!(infer_cadence(&deadlines), Some(2));
}

#[test]
fn cadence_needs_two_points() {
    assert_eq!(infer_cadence(&[]), None);
    assert_eq!(
        infer_cadence(&[Utc.with_ymd_and_hms(2021, 3, 5, 0, 0, 0).unwrap()]),
        None
    );
}

#[test]
fn cadence_is_at_least_one() {
    let deadlines = [
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap(),
    ];
    assert_eq!(infer_cadence(&deadlines), Some(1));
}

#[test]
fn half_year_mean_rounds_to_even() {
    // gaps of 2 and 3 years average to 2.5
    let deadlines = [
        Utc.with_ymd_and_hms(2019, 3, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
    ];
    assert_eq!(infer_cadence(&deadlines), Some(2));

    // gaps of 3 and 4 years average to 3.5
    let deadlines = [
        Utc.with_ymd_and_hms(2014, 3, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2017, 3, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap(),
    ];
    assert_eq!(infer_cadence(&deadlines), Some(4));
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[test]
fn yearly_family_projects_up_to_the_horizon() {
    let projected = project(&icml(), day(2024, 9, 1), &ProjectionOptions::default()).unwrap();
    let ids: Vec<&str> = projected.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["icml2025", "icml2026"]);

    let next = &projected[0];
    assert!(next.is_approximate_deadline);
    assert_eq!(next.data_src, Some(DataSource::Estimate));
    assert_eq!(next.shortname.as_deref(), Some("ICML 2025"));
    assert_eq!(next.conference_start_date.as_deref(), Some("2025-07-21"));
    assert_eq!(next.conference_end_date.as_deref(), Some("2025-07-27"));
    // whole 365-day shifts: the 2024 leap day moves the deadline a day earlier
    assert_eq!(next.timeline[0].deadline, "2025-01-31T11:59:59Z");
    assert_eq!(
        next.timeline[0].note.as_deref(),
        Some("From ICML 2024: Main track")
    );
    assert_eq!(next.tags, ["ML"]);
    assert_eq!(next.rating.as_deref(), Some("A*"));

    let after = &projected[1];
    assert_eq!(after.conference_start_date.as_deref(), Some("2026-07-21"));
    assert_eq!(after.timeline[0].deadline, "2026-01-31T11:59:59Z");
}

#[test]
fn biennial_family_skips_a_year() {
    let eccv = vec![
        edition("eccv2020", "ECCV 2020", "2020-08-23", Some("2020-08-28"), "2020-03-05T23:59:00Z"),
        edition("eccv2022", "ECCV 2022", "2022-10-23", Some("2022-10-27"), "2022-03-07T23:59:00Z"),
        edition("eccv2024", "ECCV 2024", "2024-09-29", Some("2024-10-04"), "2024-03-07T23:59:00Z"),
    ];
    let projected = project(&eccv, day(2024, 6, 1), &ProjectionOptions::default()).unwrap();
    assert_eq!(projected.len(), 1);
    assert_eq!(projected[0].id, "eccv2026");
    assert_eq!(projected[0].conference_start_date.as_deref(), Some("2026-09-29"));
}

#[test]
fn single_real_edition_projects_nothing() {
    let wacv = vec![edition(
        "wacv2025",
        "WACV 2025",
        "2025-02-28",
        Some("2025-03-04"),
        "2024-07-15T23:59:00Z",
    )];
    let projected = project(&wacv, day(2024, 9, 1), &ProjectionOptions::default()).unwrap();
    assert!(projected.is_empty());
}

#[test]
fn estimates_do_not_count_as_history_but_are_not_reemitted() {
    let mut family = icml();
    let mut estimate = edition(
        "icml2025",
        "ICML 2025",
        "2025-07-21",
        None,
        "2025-01-31T11:59:59Z",
    );
    estimate.is_approximate_deadline = true;
    estimate.data_src = Some(DataSource::Estimate);
    family.push(estimate);

    let projected = project(&family, day(2024, 9, 1), &ProjectionOptions::default()).unwrap();
    let ids: Vec<&str> = projected.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["icml2026"]);
}

#[test]
fn missing_end_date_assumes_default_duration() {
    let mut family = icml();
    family[1].conference_end_date = None;
    let projected = project(&family, day(2024, 9, 1), &ProjectionOptions::default()).unwrap();

    let start = day(2025, 7, 21);
    let expected_end = start + chrono::Duration::days(ASSUMED_DURATION_DAYS);
    assert_eq!(
        projected[0].conference_end_date.as_deref(),
        Some(expected_end.format("%Y-%m-%d").to_string().as_str())
    );
}

#[test]
fn horizon_limits_projection() {
    let options = ProjectionOptions {
        horizon_years: 0,
        ..ProjectionOptions::default()
    };
    let projected = project(&icml(), day(2024, 9, 1), &options).unwrap();
    assert!(projected.is_empty());

    let options = ProjectionOptions {
        horizon_years: 10,
        max_speculative_multiplier: 1,
    };
    let projected = project(&icml(), day(2024, 9, 1), &options).unwrap();
    assert_eq!(projected.len(), 1);
}

#[test]
fn extreme_bounds_do_not_overflow() {
    let options = ProjectionOptions {
        horizon_years: i32::MAX,
        ..ProjectionOptions::default()
    };
    let projected = project(&icml(), day(2024, 9, 1), &options).unwrap();
    let ids: Vec<&str> = projected.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["icml2025", "icml2026"]);

    let options = ProjectionOptions {
        horizon_years: 2,
        max_speculative_multiplier: i32::MAX,
    };
    let projected = project(&icml(), day(2024, 9, 1), &options).unwrap();
    assert_eq!(projected.len(), 2);
}

#[test]
fn unreadable_deadline_is_a_projection_error() {
    let mut family = icml();
    family[0].timeline[0].deadline = "TBA".to_string();
    let err = project(&family, day(2024, 9, 1), &ProjectionOptions::default()).unwrap_err();
    assert!(matches!(err, DeadlineError::Projection { ref family, .. } if family == "icml"));
}

#[test]
fn unreadable_start_date_is_a_projection_error() {
    let mut family = icml();
    family[1].conference_start_date = Some("summer".to_string());
    assert!(project(&family, day(2024, 9, 1), &ProjectionOptions::default()).is_err());
}
