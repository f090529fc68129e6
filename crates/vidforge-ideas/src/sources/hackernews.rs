//! Hacker News top stories (Firebase API).

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Deserialize;
use vidforge_core::TrendSource;

use super::{non_empty, SourceClient, MAX_PER_SOURCE};
use crate::error::IdeaError;
use crate::types::RawCandidate;

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    score: f64,
    time: Option<i64>,
}

pub(super) async fn fetch(
    client: &SourceClient,
    now: DateTime<Utc>,
) -> Result<Vec<RawCandidate>, IdeaError> {
    let url = client.url(TrendSource::HackerNews, "v0/topstories.json", &[])?;
    let ids: Vec<u64> = client.get_json(&url).await?;

    let items = join_all(
        ids.iter()
            .take(MAX_PER_SOURCE)
            .map(|id| fetch_item(client, *id)),
    )
    .await;

    Ok(items
        .into_iter()
        .flatten()
        .filter_map(|item| to_candidate(item, now))
        .collect())
}

/// A single story. Failures drop the story, not the feed.
async fn fetch_item(client: &SourceClient, id: u64) -> Option<Item> {
    let url = client
        .url(TrendSource::HackerNews, &format!("v0/item/{id}.json"), &[])
        .ok()?;
    match client.get_json::<Option<Item>>(&url).await {
        Ok(item) => item,
        Err(e) => {
            tracing::debug!(source = "hackernews", id, error = %e, "skipping story");
            None
        }
    }
}

fn to_candidate(item: Item, now: DateTime<Utc>) -> Option<RawCandidate> {
    if item.kind.as_deref() != Some("story") {
        return None;
    }
    let title = non_empty(item.title)?;
    Some(RawCandidate {
        source: TrendSource::HackerNews,
        title,
        url: non_empty(item.url),
        popularity_signal: item.score.max(0.0),
        fetched_at: now,
        published_at: item.time.and_then(|t| DateTime::from_timestamp(t, 0)),
        description: None,
        tags: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn only_stories_with_titles_are_kept() {
        let now = Utc::now();
        let story = item(serde_json::json!({
            "type": "story", "title": "Show HN: a tiny database", "score": 321, "time": 1_700_000_000
        }));
        let job = item(serde_json::json!({ "type": "job", "title": "We're hiring" }));
        let untitled = item(serde_json::json!({ "type": "story", "score": 5 }));

        let kept = to_candidate(story, now).unwrap();
        assert_eq!(kept.title, "Show HN: a tiny database");
        assert!((kept.popularity_signal - 321.0).abs() < f64::EPSILON);
        assert!(kept.published_at.is_some());
        assert!(to_candidate(job, now).is_none());
        assert!(to_candidate(untitled, now).is_none());
    }
}
