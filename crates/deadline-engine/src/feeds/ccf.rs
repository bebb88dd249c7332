//! `ccf-deadlines` feed: one YAML file per conference, holding every edition.

use serde::Deserialize;

use crate::error::Result;
use crate::model::{ConferenceInstance, DeadlineRound};

#[derive(Debug, Deserialize)]
struct Conference {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    confs: Vec<Edition>,
}

#[derive(Debug, Deserialize)]
struct Edition {
    year: i32,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    timeline: Vec<Round>,
}

#[derive(Debug, Deserialize)]
struct Round {
    #[serde(default)]
    deadline: Option<String>,
    #[serde(default)]
    abstract_deadline: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

/// Parse one feed file into one record per edition. Rounds without a
/// deadline are dropped, and so are editions left without any round.
pub fn parse(yaml: &str) -> Result<Vec<ConferenceInstance>> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let conferences: Option<Vec<Conference>> = serde_yaml::from_str(yaml)?;
    let mut out = Vec::new();
    for conf in conferences.unwrap_or_default() {
        let family = conf.title.to_lowercase().replace("3dv", "threedv");
        for edition in conf.confs {
            let timeline: Vec<DeadlineRound> = edition
                .timeline
                .into_iter()
                .filter_map(|round| {
                    Some(DeadlineRound {
                        deadline: round.deadline?,
                        abstract_deadline: round.abstract_deadline,
                        note: round.comment,
                    })
                })
                .collect();
            let id = format!("{}{}", family, edition.year);
            if timeline.is_empty() {
                tracing::debug!(%id, "ccf edition without deadlines");
                continue;
            }
            out.push(ConferenceInstance {
                id,
                title: conf.description.clone(),
                shortname: Some(format!("{} {}", conf.title, edition.year)),
                website: edition.link,
                timezone: edition.timezone,
                timeline,
                ..ConferenceInstance::default()
            });
        }
    }
    Ok(out)
}
