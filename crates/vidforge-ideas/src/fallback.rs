//! Built-in ideas used when no trend source answered.

use chrono::{DateTime, Utc};

use crate::dedup_log::DedupSnapshot;
use crate::selector::{select, SelectionMode};
use crate::text::normalize_keywords;
use crate::types::{ScoredIdea, SelectionResult};

struct StaticIdea {
    title: &'static str,
    hook: &'static str,
    keyword: &'static str,
    viral_score: u8,
}

const STATIC_IDEAS: [StaticIdea; 3] = [
    StaticIdea {
        title: "The Hidden Power of Async/Await in JavaScript",
        hook: "Most developers miss this async trick...",
        keyword: "JavaScript",
        viral_score: 72,
    },
    StaticIdea {
        title: "Why Your API Design is Wrong",
        hook: "APIs should be designed differently...",
        keyword: "API Design",
        viral_score: 70,
    },
    StaticIdea {
        title: "Database Optimization Will Change Everything",
        hook: "This database trick saved us $100k...",
        keyword: "Database Optimization",
        viral_score: 74,
    },
];

impl StaticIdea {
    fn to_scored(&self) -> ScoredIdea {
        ScoredIdea {
            title: self.title.to_owned(),
            hook: self.hook.to_owned(),
            keywords: normalize_keywords([self.keyword]),
            viral_score: self.viral_score,
            source_candidate: None,
            optimized: false,
        }
    }
}

/// The built-in ideas, scored in the fallback band and never marked optimized.
#[must_use]
pub fn static_ideas() -> Vec<ScoredIdea> {
    STATIC_IDEAS.iter().map(StaticIdea::to_scored).collect()
}

/// Selection over the built-in ideas alone.
#[must_use]
pub fn static_selection(
    used: &DedupSnapshot,
    mode: SelectionMode,
    now: DateTime<Utc>,
) -> SelectionResult {
    select(static_ideas(), used, mode, now).unwrap_or_else(|| SelectionResult {
        chosen: STATIC_IDEAS[2].to_scored(),
        alternates: Vec::new(),
        selected_at: now,
        relaxed: false,
    })
}
