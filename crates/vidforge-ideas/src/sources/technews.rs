//! General tech news: the Lobsters "hottest" front page.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use vidforge_core::TrendSource;

use super::{non_empty, parse_rfc3339, SourceClient, MAX_PER_SOURCE};
use crate::error::IdeaError;
use crate::types::RawCandidate;

#[derive(Debug, Deserialize)]
struct Story {
    title: Option<String>,
    url: Option<String>,
    comments_url: Option<String>,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    tags: Vec<String>,
    created_at: Option<String>,
    description_plain: Option<String>,
}

pub(super) async fn fetch(
    client: &SourceClient,
    now: DateTime<Utc>,
) -> Result<Vec<RawCandidate>, IdeaError> {
    let url = client.url(TrendSource::TechNews, "hottest.json", &[])?;
    let stories: Vec<Story> = client.get_json(&url).await?;
    Ok(to_candidates(stories, now))
}

fn to_candidates(stories: Vec<Story>, now: DateTime<Utc>) -> Vec<RawCandidate> {
    stories
        .into_iter()
        .filter_map(|story| {
            let title = non_empty(story.title)?;
            Some(RawCandidate {
                source: TrendSource::TechNews,
                title,
                // Text posts have an empty `url`; link to the discussion instead.
                url: non_empty(story.url).or_else(|| non_empty(story.comments_url)),
                popularity_signal: story.score.max(0.0),
                fetched_at: now,
                published_at: parse_rfc3339(story.created_at.as_deref()),
                description: non_empty(story.description_plain),
                tags: story.tags,
            })
        })
        .take(MAX_PER_SOURCE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_posts_link_to_comments() {
        let stories: Vec<Story> = serde_json::from_value(serde_json::json!([
            { "title": "Ask: what are you reading?", "url": "",
              "comments_url": "https://lobste.rs/s/abc", "score": 12,
              "tags": ["ask"], "created_at": "2024-05-01T06:00:00.000-05:00" }
        ]))
        .unwrap();

        let candidates = to_candidates(stories, Utc::now());
        assert_eq!(candidates[0].url.as_deref(), Some("https://lobste.rs/s/abc"));
        assert_eq!(candidates[0].tags, vec!["ask".to_owned()]);
        assert!(candidates[0].published_at.is_some());
    }

    #[test]
    fn caps_at_max_per_source() {
        let stories: Vec<Story> = (0..20)
            .map(|i| Story {
                title: Some(format!("story {i}")),
                url: None,
                comments_url: None,
                score: 1.0,
                tags: Vec::new(),
                created_at: None,
                description_plain: None,
            })
            .collect();
        assert_eq!(to_candidates(stories, Utc::now()).len(), MAX_PER_SOURCE);
    }
}
