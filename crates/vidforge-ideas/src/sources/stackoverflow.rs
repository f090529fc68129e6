//! Stack Overflow popular tags (Stack Exchange API 2.3).

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use vidforge_core::TrendSource;

use super::{non_empty, SourceClient, MAX_PER_SOURCE};
use crate::error::IdeaError;
use crate::types::RawCandidate;

/// Tags below this question count are kept only when they have synonyms.
const MIN_TAG_QUESTIONS: f64 = 50_000.0;

#[derive(Debug, Deserialize)]
struct TagsResponse {
    items: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: Option<String>,
    #[serde(default)]
    count: f64,
    #[serde(default)]
    has_synonyms: bool,
}

pub(super) async fn fetch(
    client: &SourceClient,
    now: DateTime<Utc>,
) -> Result<Vec<RawCandidate>, IdeaError> {
    let url = client.url(
        TrendSource::StackOverflow,
        "2.3/tags",
        &[
            ("site", "stackoverflow"),
            ("sort", "popular"),
            ("order", "desc"),
            ("pagesize", "10"),
        ],
    )?;
    let response: TagsResponse = client.get_json(&url).await?;
    Ok(to_candidates(response.items, now))
}

fn to_candidates(tags: Vec<Tag>, now: DateTime<Utc>) -> Vec<RawCandidate> {
    tags.into_iter()
        .take(MAX_PER_SOURCE)
        .filter(|tag| tag.has_synonyms || tag.count > MIN_TAG_QUESTIONS)
        .filter_map(|tag| {
            let name = non_empty(tag.name)?;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let questions = tag.count.max(0.0) as u64;
            Some(RawCandidate {
                source: TrendSource::StackOverflow,
                title: format!("Mastering {name} on Stack Overflow"),
                url: tagged_url(&name),
                popularity_signal: tag.count.max(0.0),
                fetched_at: now,
                published_at: None,
                description: Some(format!("{questions} questions about {name}")),
                tags: vec![name],
            })
        })
        .collect()
}

fn tagged_url(tag: &str) -> Option<String> {
    let mut url = Url::parse("https://stackoverflow.com/questions/tagged").ok()?;
    url.path_segments_mut().ok()?.push(tag);
    Some(url.into())
}
