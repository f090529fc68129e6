//! GitHub repository search, most-starred repositories in the tracked languages.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use vidforge_core::TrendSource;

use super::{non_empty, parse_rfc3339, SourceClient, MAX_PER_SOURCE};
use crate::error::IdeaError;
use crate::types::RawCandidate;

const QUERY: &str = "language:python OR language:javascript OR language:rust OR language:go";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<Repo>,
}

#[derive(Debug, Deserialize)]
struct Repo {
    name: Option<String>,
    html_url: Option<String>,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: f64,
    created_at: Option<String>,
}

pub(super) async fn fetch(
    client: &SourceClient,
    now: DateTime<Utc>,
) -> Result<Vec<RawCandidate>, IdeaError> {
    let url = client.url(
        TrendSource::Github,
        "search/repositories",
        &[
            ("q", QUERY),
            ("sort", "stars"),
            ("order", "desc"),
            ("per_page", "15"),
        ],
    )?;
    let response: SearchResponse = client.get_json(&url).await?;
    Ok(to_candidates(response.items, now))
}

fn to_candidates(repos: Vec<Repo>, now: DateTime<Utc>) -> Vec<RawCandidate> {
    repos
        .into_iter()
        .filter_map(|repo| {
            let name = non_empty(repo.name)?;
            Some(RawCandidate {
                source: TrendSource::Github,
                title: format!("{name} - GitHub Trending"),
                url: non_empty(repo.html_url),
                popularity_signal: repo.stargazers_count.max(0.0),
                fetched_at: now,
                published_at: parse_rfc3339(repo.created_at.as_deref()),
                description: non_empty(repo.description),
                tags: non_empty(repo.language).into_iter().collect(),
            })
        })
        .take(MAX_PER_SOURCE)
        .collect()
}
