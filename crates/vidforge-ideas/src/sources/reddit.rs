//! Reddit r/programming top posts of the week (public JSON listing, no OAuth).

use chrono::{DateTime, Utc};
use serde::Deserialize;
use vidforge_core::TrendSource;

use super::{non_empty, SourceClient, MAX_PER_SOURCE};
use crate::error::IdeaError;
use crate::types::RawCandidate;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    permalink: Option<String>,
    url: Option<String>,
    #[serde(default)]
    is_self: bool,
    #[serde(default)]
    score: f64,
    created_utc: Option<f64>,
    link_flair_text: Option<String>,
}

pub(super) async fn fetch(
    client: &SourceClient,
    now: DateTime<Utc>,
) -> Result<Vec<RawCandidate>, IdeaError> {
    let url = client.url(
        TrendSource::Reddit,
        "r/programming/top.json",
        &[("t", "week"), ("limit", "10")],
    )?;
    let listing: Listing = client.get_json(&url).await?;
    Ok(to_candidates(listing, now))
}

fn to_candidates(listing: Listing, now: DateTime<Utc>) -> Vec<RawCandidate> {
    listing
        .data
        .children
        .into_iter()
        .map(|post| post.data)
        .filter(|post| post.is_self || post.url.is_some())
        .filter_map(|post| {
            let title = non_empty(post.title)?;
            #[allow(clippy::cast_possible_truncation)]
            let published_at = post
                .created_utc
                .and_then(|secs| DateTime::from_timestamp(secs as i64, 0));
            Some(RawCandidate {
                source: TrendSource::Reddit,
                title,
                url: non_empty(post.permalink)
                    .map(|p| format!("https://reddit.com{p}"))
                    .or(post.url),
                popularity_signal: post.score.max(0.0),
                fetched_at: now,
                published_at,
                description: None,
                tags: non_empty(post.link_flair_text).into_iter().collect(),
            })
        })
        .take(MAX_PER_SOURCE)
        .collect()
}
