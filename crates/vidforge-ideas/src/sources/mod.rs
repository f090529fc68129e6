//! Trend source fetchers.
//!
//! Every fetcher is a GET against a public JSON endpoint. Failures never
//! propagate: each one is logged and reported as [`FetchOutcome::Unavailable`]
//! so the rest of the run can continue with whatever the other feeds returned.

mod devto;
mod github;
mod hackernews;
mod reddit;
mod stackoverflow;
mod technews;

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use vidforge_core::{AppConfig, TrendSource};

use crate::error::IdeaError;
use crate::retry::retry_with_backoff;
use crate::types::RawCandidate;

/// Maximum candidates kept per source per run.
pub(crate) const MAX_PER_SOURCE: usize = 8;

/// Result of one fetcher call.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(Vec<RawCandidate>),
    Unavailable { source: TrendSource, reason: String },
}

/// Merged output of all fetchers for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectReport {
    /// Candidates from every source that answered, in source precedence order.
    pub candidates: Vec<RawCandidate>,
    pub unavailable: Vec<(TrendSource, String)>,
}

impl CollectReport {
    #[must_use]
    pub fn all_unavailable(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// HTTP knobs shared by every outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub user_agent: String,
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.http_timeout_secs,
            max_retries: config.http_max_retries,
            retry_backoff_ms: config.http_retry_backoff_ms,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 2,
            retry_backoff_ms: 500,
            user_agent: "vidforge/0.1 (trend-ideas)".to_owned(),
        }
    }
}

/// Base URLs of the six feeds. Tests point them all at one mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEndpoints {
    pub github: String,
    pub hackernews: String,
    pub devto: String,
    pub reddit: String,
    pub stackoverflow: String,
    pub technews: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            github: "https://api.github.com".to_owned(),
            hackernews: "https://hacker-news.firebaseio.com".to_owned(),
            devto: "https://dev.to".to_owned(),
            reddit: "https://www.reddit.com".to_owned(),
            stackoverflow: "https://api.stackexchange.com".to_owned(),
            technews: "https://lobste.rs".to_owned(),
        }
    }
}

impl SourceEndpoints {
    /// Every feed served from the same base URL.
    #[must_use]
    pub fn all_at(base_url: &str) -> Self {
        Self {
            github: base_url.to_owned(),
            hackernews: base_url.to_owned(),
            devto: base_url.to_owned(),
            reddit: base_url.to_owned(),
            stackoverflow: base_url.to_owned(),
            technews: base_url.to_owned(),
        }
    }

    fn get(&self, source: TrendSource) -> &str {
        match source {
            TrendSource::Github => &self.github,
            TrendSource::HackerNews => &self.hackernews,
            TrendSource::DevTo => &self.devto,
            TrendSource::Reddit => &self.reddit,
            TrendSource::StackOverflow => &self.stackoverflow,
            TrendSource::TechNews => &self.technews,
        }
    }
}

/// HTTP client for the trend feeds.
pub struct SourceClient {
    client: Client,
    bases: Vec<(TrendSource, Url)>,
    max_retries: u32,
    retry_backoff_ms: u64,
    topic: Option<String>,
}

impl SourceClient {
    /// Client pointed at the production feeds.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(settings: &HttpSettings) -> Result<Self, IdeaError> {
        Self::with_endpoints(settings, &SourceEndpoints::default())
    }

    /// Client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`IdeaError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`IdeaError::InvalidUrl`] if a base URL does not parse.
    pub fn with_endpoints(
        settings: &HttpSettings,
        endpoints: &SourceEndpoints,
    ) -> Result<Self, IdeaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs.min(10)))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        let bases = TrendSource::ALL
            .into_iter()
            .map(|source| parse_base_url(endpoints.get(source)).map(|url| (source, url)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            client,
            bases,
            max_retries: settings.max_retries,
            retry_backoff_ms: settings.retry_backoff_ms,
            topic: None,
        })
    }

    /// Restrict topic-aware feeds (Dev.to tag) to `topic`.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        let topic = topic.into();
        self.topic = (!topic.trim().is_empty()).then(|| topic.trim().to_lowercase());
        self
    }

    pub(crate) fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Run one fetcher. Never fails: errors become [`FetchOutcome::Unavailable`].
    pub async fn fetch(&self, source: TrendSource, now: DateTime<Utc>) -> FetchOutcome {
        let result = match source {
            TrendSource::Github => github::fetch(self, now).await,
            TrendSource::HackerNews => hackernews::fetch(self, now).await,
            TrendSource::DevTo => devto::fetch(self, now).await,
            TrendSource::Reddit => reddit::fetch(self, now).await,
            TrendSource::StackOverflow => stackoverflow::fetch(self, now).await,
            TrendSource::TechNews => technews::fetch(self, now).await,
        };

        match result {
            Ok(mut candidates) => {
                candidates.truncate(MAX_PER_SOURCE);
                tracing::debug!(
                    source = source.as_str(),
                    count = candidates.len(),
                    "collected trend candidates"
                );
                FetchOutcome::Fetched(candidates)
            }
            Err(e) => {
                tracing::warn!(
                    source = source.as_str(),
                    error = %e,
                    "trend source unavailable"
                );
                FetchOutcome::Unavailable {
                    source,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Run `sources` concurrently and merge the results in the given order.
    pub async fn collect_candidates(
        &self,
        sources: &[TrendSource],
        now: DateTime<Utc>,
    ) -> CollectReport {
        let outcomes = join_all(sources.iter().map(|s| self.fetch(*s, now))).await;

        let mut report = CollectReport::default();
        for outcome in outcomes {
            match outcome {
                FetchOutcome::Fetched(candidates) => report.candidates.extend(candidates),
                FetchOutcome::Unavailable { source, reason } => {
                    report.unavailable.push((source, reason));
                }
            }
        }

        tracing::info!(
            candidates = report.candidates.len(),
            unavailable = report.unavailable.len(),
            "trend collection finished"
        );
        report
    }

    fn url(
        &self,
        source: TrendSource,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Url, IdeaError> {
        let base = self
            .bases
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, url)| url)
            .ok_or_else(|| IdeaError::InvalidUrl {
                url: String::new(),
                reason: format!("no base URL for {source}"),
            })?;
        let mut url = base.join(path).map_err(|e| IdeaError::InvalidUrl {
            url: format!("{base}{path}"),
            reason: e.to_string(),
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GET `url`, require a 2xx status and decode the JSON body, with the
    /// per-call retry policy.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, IdeaError> {
        let client = &self.client;
        retry_with_backoff(self.max_retries, self.retry_backoff_ms, move || async move {
            let response = client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(IdeaError::Status {
                    context: url.to_string(),
                    status,
                });
            }
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| IdeaError::Deserialize {
                context: url.to_string(),
                source: e,
            })
        })
        .await
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, IdeaError> {
    // Exactly one trailing slash so `join` appends instead of replacing the last segment.
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| IdeaError::InvalidUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// RFC 3339 timestamp, tolerating garbage.
pub(crate) fn parse_rfc3339(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Non-empty trimmed string.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
