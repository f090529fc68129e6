//! Dev.to top articles of the week.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use vidforge_core::TrendSource;

use super::{non_empty, parse_rfc3339, SourceClient, MAX_PER_SOURCE};
use crate::error::IdeaError;
use crate::types::RawCandidate;

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    #[serde(default)]
    public_reactions_count: f64,
    #[serde(default)]
    tag_list: Vec<String>,
    published_at: Option<String>,
}

pub(super) async fn fetch(
    client: &SourceClient,
    now: DateTime<Utc>,
) -> Result<Vec<RawCandidate>, IdeaError> {
    let mut query = vec![("per_page", "15"), ("top", "7")];
    if let Some(topic) = client.topic() {
        query.push(("tag", topic));
    }
    let url = client.url(TrendSource::DevTo, "api/articles", &query)?;
    let articles: Vec<Article> = client.get_json(&url).await?;
    Ok(to_candidates(articles, now))
}

fn to_candidates(articles: Vec<Article>, now: DateTime<Utc>) -> Vec<RawCandidate> {
    articles
        .into_iter()
        .filter_map(|article| {
            let title = non_empty(article.title)?;
            Some(RawCandidate {
                source: TrendSource::DevTo,
                title,
                url: non_empty(article.url),
                popularity_signal: article.public_reactions_count.max(0.0),
                fetched_at: now,
                published_at: parse_rfc3339(article.published_at.as_deref()),
                description: non_empty(article.description),
                tags: article
                    .tag_list
                    .into_iter()
                    .filter(|t| !t.trim().is_empty())
                    .collect(),
            })
        })
        .take(MAX_PER_SOURCE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn articles_map_reactions_and_tags() {
        let articles: Vec<Article> = serde_json::from_value(serde_json::json!([
            {
                "title": "10 CSS tricks",
                "url": "https://dev.to/a/css",
                "public_reactions_count": 140,
                "tag_list": ["css", "webdev", ""],
                "published_at": "2024-05-01T10:00:00Z"
            },
            { "title": "   ", "public_reactions_count": 900 }
        ]))
        .unwrap();

        let candidates = to_candidates(articles, Utc::now());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].tags, vec!["css".to_owned(), "webdev".to_owned()]);
        assert!((candidates[0].popularity_signal - 140.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let articles: Vec<Article> = serde_json::from_value(serde_json::json!([
            { "title": "Hello", "type_of": "article", "user": { "name": "x" } }
        ]))
        .unwrap();
        assert_eq!(to_candidates(articles, Utc::now()).len(), 1);
    }
}
