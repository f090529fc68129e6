use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vidforge_core::TrendSource;

/// A single trending item as returned by one source, before any scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub source: TrendSource,
    pub title: String,
    pub url: Option<String>,
    /// Source-native popularity: stars, points, reactions, question count.
    pub popularity_signal: f64,
    pub fetched_at: DateTime<Utc>,
    /// When the item itself was created or published, if the source says.
    pub published_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl RawCandidate {
    /// Candidate with only the required fields set.
    #[must_use]
    pub fn new(
        source: TrendSource,
        title: impl Into<String>,
        popularity_signal: f64,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            title: title.into(),
            url: None,
            popularity_signal,
            fetched_at,
            published_at: None,
            description: None,
            tags: Vec::new(),
        }
    }
}

/// Aggregator output: a deduplicated candidate with its normalized scores.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: RawCandidate,
    pub normalized_title: String,
    /// Log-scaled popularity in `[0, 1]`.
    pub popularity: f64,
    /// Exponential-decay recency in `[0, 1]`.
    pub recency: f64,
    pub score: f64,
    /// 0-based position in the ranked list.
    pub rank: usize,
}

/// A content concept with its predicted engagement.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredIdea {
    pub title: String,
    pub hook: String,
    pub keywords: BTreeSet<String>,
    /// 0..=100. `85..=99` when the optimizer produced it, below 85 otherwise.
    pub viral_score: u8,
    /// `None` only for the built-in fallback ideas.
    pub source_candidate: Option<RawCandidate>,
    pub optimized: bool,
}

impl ScoredIdea {
    #[must_use]
    pub fn source(&self) -> Option<TrendSource> {
        self.source_candidate.as_ref().map(|c| c.source)
    }
}

/// Outcome of the selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub chosen: ScoredIdea,
    /// Remaining picks, highest first.
    pub alternates: Vec<ScoredIdea>,
    pub selected_at: DateTime<Utc>,
    /// `true` when every idea had been used before and the dedup filter
    /// was dropped to still produce a choice.
    pub relaxed: bool,
}

impl SelectionResult {
    /// Chosen idea followed by the alternates.
    pub fn picks(&self) -> impl Iterator<Item = &ScoredIdea> {
        std::iter::once(&self.chosen).chain(self.alternates.iter())
    }
}

/// One line of the dedup log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupEntry {
    pub normalized_title: String,
    /// Normalized and sorted.
    pub keywords: Vec<String>,
    /// Normalized title of the trend candidate the idea was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
    pub chosen_at: DateTime<Utc>,
}

/// The hand-off record consumed by script generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaRecord {
    /// First 12 hex characters of SHA-256 over the normalized title.
    pub id: String,
    pub title: String,
    pub hook: String,
    pub keywords: Vec<String>,
    pub viral_score: u8,
    pub niche: String,
    pub optimized: bool,
    pub source: Option<TrendSource>,
    pub url: Option<String>,
    pub generated_at: DateTime<Utc>,
}
