//! Tests for the third-party feed adapters and the file-backed sources.

use deadline_engine::feeds::{ccf, hf, nino, FeedFile, FeedFormat};
use deadline_engine::{
    DataSource, DeadlineError, DeadlineRound, Pipeline, PipelineOptions, RecordsFile, Source,
};

const HF_FEED: &str = r#"
- title: CVPR
  year: 2025
  id: cvpr25
  full_name: IEEE/CVF Conference on Computer Vision and Pattern Recognition
  link: https://cvpr.thecvf.com/Conferences/2025
  deadline: '2024-11-14 23:59:59'
  abstract_deadline: '2024-11-01 23:59:59'
  timezone: UTC-8
  city: Nashville
  country: USA
  date: June 11-15, 2025
  tags:
    - computer-vision
    - machine-learning
    - benchmarks
- title: WACV
  year: 2026
  deadlines:
    - type: submission
      label: Round 1
      date: '2025-07-11 23:59:59'
    - type: rebuttal
      date: '2025-08-20 23:59:59'
    - type: submission
      label: Round 2
      date: '2025-09-12 23:59:59'
  start: '2026-03-06'
  end: '2026-03-10'
  venue: Tucson, Arizona
- title: ICLR
  year: 2026
  date: TBD
  deadline: '2025-09-24 23:59'
- title: AAAI
  year: 2026
  date: January 20-27, 2026
"#;

const CCF_FEED: &str = r#"
- title: 3DV
  description: International Conference on 3D Vision
  sub: CG
  rank:
    ccf: N
  dblp: 3dim
  confs:
    - year: 2025
      id: 3dv25
      link: https://3dvconf.github.io/2025/
      timeline:
        - abstract_deadline: '2024-08-05 23:59:59'
          deadline: '2024-08-12 23:59:59'
          comment: Paper submission
        - comment: Notification only
      timezone: AoE
      date: March 25-28, 2025
      place: Singapore
    - year: 2026
      id: 3dv26
      timeline: []
      timezone: AoE
"#;

const NINO_FEED: &str = r#"[
  {
    "id": "icml",
    "name": "ICML 2025",
    "deadline": "2025-01-30 23:59",
    "location": "Vancouver, Canada",
    "type": "ML",
    "timezone": "UTC-12",
    "link": "https://icml.cc",
    "date_start": "2025-07-13",
    "date_end": "2025-07-19"
  }
]"#;

const NINO_PAST: &str = r#"
{"id": "nips", "name": "NIPS 2017", "deadline": "2017-05-19 20:00", "location": "Long Beach", "type": "ML", "timezone": "UTC", "link": "https://nips.cc", "date_start": "2017-12-04", "date_end": "2017-12-09"},
{"id": "iros", "name": "IROS 2018", "deadline": "2018-03-01 23:59", "location": "Madrid", "type": "RO", "timezone": "UTC-8", "link": "https://iros2018.org", "date_start": "2018-10-01", "date_end": "2018-10-05"},
"#;

// ---------------------------------------------------------------------------
// Hugging Face
// ---------------------------------------------------------------------------

#[test]
fn hf_entry_with_single_deadline_and_date_range() {
    let records = hf::parse(HF_FEED).unwrap();
    let cvpr = &records[0];

    assert_eq!(cvpr.id, "cvpr2025");
    assert_eq!(cvpr.shortname.as_deref(), Some("CVPR 2025"));
    assert_eq!(
        cvpr.title.as_deref(),
        Some("IEEE/CVF Conference on Computer Vision and Pattern Recognition")
    );
    assert_eq!(cvpr.website.as_deref(), Some("https://cvpr.thecvf.com/Conferences/2025"));
    assert_eq!(cvpr.location.as_deref(), Some("Nashville, USA"));
    assert_eq!(cvpr.conference_start_date.as_deref(), Some("June 11, 2025"));
    assert_eq!(cvpr.conference_end_date.as_deref(), Some("June 15, 2025"));
    assert_eq!(cvpr.timezone.as_deref(), Some("UTC-8"));
    assert_eq!(cvpr.tags, ["CV", "ML"]);
    assert_eq!(
        cvpr.timeline,
        vec![DeadlineRound {
            deadline: "2024-11-14 23:59:59".to_string(),
            abstract_deadline: Some("2024-11-01 23:59:59".to_string()),
            note: None,
        }]
    );
}

#[test]
fn hf_typed_deadlines_keep_only_submissions() {
    let records = hf::parse(HF_FEED).unwrap();
    let wacv = records.iter().find(|c| c.id == "wacv2026").unwrap();

    let notes: Vec<_> = wacv.timeline.iter().map(|r| r.note.as_deref()).collect();
    assert_eq!(notes, [Some("Round 1"), Some("Round 2")]);
    assert_eq!(wacv.conference_start_date.as_deref(), Some("2026-03-06"));
    assert_eq!(wacv.location.as_deref(), Some("Tucson, Arizona"));
}

#[test]
fn hf_entries_without_dates_or_deadlines_are_skipped() {
    let ids: Vec<String> = hf::parse(HF_FEED).unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, ["cvpr2025", "wacv2026"]);
}

#[test]
fn hf_empty_document() {
    assert!(hf::parse("").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// ccf-deadlines
// ---------------------------------------------------------------------------

#[test]
fn ccf_editions_become_instances() {
    let records = ccf::parse(CCF_FEED).unwrap();
    assert_eq!(records.len(), 1, "edition without rounds is dropped");

    let threedv = &records[0];
    assert_eq!(threedv.id, "threedv2025");
    assert_eq!(threedv.shortname.as_deref(), Some("3DV 2025"));
    assert_eq!(threedv.title.as_deref(), Some("International Conference on 3D Vision"));
    assert_eq!(threedv.website.as_deref(), Some("https://3dvconf.github.io/2025/"));
    assert_eq!(threedv.timezone.as_deref(), Some("AoE"));
    assert!(threedv.tags.is_empty());
    assert_eq!(
        threedv.timeline,
        vec![DeadlineRound {
            deadline: "2024-08-12 23:59:59".to_string(),
            abstract_deadline: Some("2024-08-05 23:59:59".to_string()),
            note: Some("Paper submission".to_string()),
        }]
    );
}

#[test]
fn ccf_malformed_document_is_an_error() {
    assert!(matches!(
        ccf::parse("- title: [broken"),
        Err(DeadlineError::Yaml(_))
    ));
}

// ---------------------------------------------------------------------------
// NunoDuarte
// ---------------------------------------------------------------------------

#[test]
fn nino_current_list() {
    let records = nino::parse(NINO_FEED).unwrap();
    assert_eq!(records.len(), 1);

    let icml = &records[0];
    assert_eq!(icml.id, "icml2025");
    assert_eq!(icml.shortname.as_deref(), Some("ICML 2025"));
    assert_eq!(icml.tags, ["ML"]);
    assert_eq!(icml.timezone.as_deref(), Some("UTC-12"));
    assert_eq!(icml.conference_end_date.as_deref(), Some("2025-07-19"));
    assert_eq!(icml.timeline, vec![DeadlineRound::new("2025-01-30 23:59")]);
}

#[test]
fn nino_past_dump_without_brackets() {
    let ids: Vec<String> = nino::parse_past(NINO_PAST)
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, ["nips2017", "iros2018"]);
    assert!(nino::parse_past("  \n").unwrap().is_empty());
}

#[test]
fn nino_unreadable_start_date_fails_the_document() {
    let feed = NINO_FEED.replace("2025-07-13", "someday");
    assert!(matches!(
        nino::parse(&feed),
        Err(DeadlineError::UnparsableDate(_))
    ));
}

// ---------------------------------------------------------------------------
// File-backed sources
// ---------------------------------------------------------------------------

#[test]
fn feed_file_reads_snapshots_at_feed_trust() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("3dv.yml");
    std::fs::write(&path, CCF_FEED).unwrap();

    let mut feed = FeedFile::new("ccf", FeedFormat::Ccf, vec![path.clone()]);
    assert_eq!(feed.name(), "ccf");
    assert_eq!(feed.trust(), DataSource::CcfDeadlines);
    assert_eq!(feed.fetch().unwrap().len(), 1);

    let overridden = FeedFile::new("ccf", FeedFormat::Ccf, vec![path]).with_trust(DataSource::Manual);
    assert_eq!(overridden.trust(), DataSource::Manual);
}

#[test]
fn feed_file_picks_past_dump_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let current = dir.path().join("conferences.json");
    let past = dir.path().join("past_conferences.txt");
    std::fs::write(&current, NINO_FEED).unwrap();
    std::fs::write(&past, NINO_PAST).unwrap();

    let mut feed = FeedFile::new("nino", FeedFormat::Nino, vec![current, past]);
    assert_eq!(feed.fetch().unwrap().len(), 3);
}

#[test]
fn missing_feed_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut feed = FeedFile::new("hf", FeedFormat::Hf, vec![dir.path().join("gone.yml")]);
    assert!(matches!(feed.fetch(), Err(DeadlineError::Io(_))));
}

#[test]
fn records_file_accepts_json_lists_and_yaml_maps() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("scraped.json");
    std::fs::write(
        &json,
        r#"[{"id": "iccv2025", "timeline": [{"deadline": "2025-03-07 23:59"}], "dataSrc": "off-website"}]"#,
    )
    .unwrap();
    let yaml = dir.path().join("manual.yaml");
    std::fs::write(
        &yaml,
        "eccv2026:\n  location: Malmö, Sweden\n  timeline:\n    - deadline: '2026-03-05 23:59'\n",
    )
    .unwrap();

    let mut source = RecordsFile::new("manual", DataSource::Manual, vec![json, yaml]);
    let records = source.fetch().unwrap();
    let ids: Vec<&str> = records.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["iccv2025", "eccv2026"]);
    assert_eq!(records[1].location.as_deref(), Some("Malmö, Sweden"));
}

// ---------------------------------------------------------------------------
// Feeds through the pipeline
// ---------------------------------------------------------------------------

#[test]
fn feed_records_are_normalized_on_ingest() {
    let today = chrono::NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    let mut p = Pipeline::new(PipelineOptions::new(today));
    p.ingest(DataSource::CcfDeadlines, ccf::parse(CCF_FEED).unwrap());
    p.ingest(DataSource::HfRepo, hf::parse(HF_FEED).unwrap());

    let threedv = p.get("threedv2025").unwrap();
    assert_eq!(threedv.timeline[0].deadline, "2024-08-13T11:59:59Z");
    assert_eq!(
        threedv.timeline[0].abstract_deadline.as_deref(),
        Some("2024-08-06T11:59:59Z")
    );

    let cvpr = p.get("cvpr2025").unwrap();
    assert_eq!(cvpr.conference_start_date.as_deref(), Some("2025-06-11"));
    assert_eq!(cvpr.timeline[0].deadline, "2024-11-15T07:59:59Z");
    assert_eq!(cvpr.data_src, Some(DataSource::HfRepo));
}
