//! Pick the idea (or batch of ideas) to produce next.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use vidforge_core::TrendSource;

use crate::dedup_log::DedupSnapshot;
use crate::types::{ScoredIdea, SelectionResult};

/// How many ideas a run hands off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// One chosen idea; every other unused idea is kept as an alternate.
    Single,
    /// The chosen idea plus the next `n - 1` as alternates.
    Batch(usize),
}

impl SelectionMode {
    /// `Single` for a count of one, `Batch(count)` otherwise.
    #[must_use]
    pub fn for_count(count: usize) -> Self {
        if count <= 1 {
            SelectionMode::Single
        } else {
            SelectionMode::Batch(count)
        }
    }
}

/// Order ideas best first and drop the ones the dedup log has seen.
///
/// Returns `None` only for an empty `ideas`. When every idea has been used
/// before, the filter is relaxed and the result is marked `relaxed`.
#[must_use]
pub fn select(
    ideas: Vec<ScoredIdea>,
    used: &DedupSnapshot,
    mode: SelectionMode,
    now: DateTime<Utc>,
) -> Option<SelectionResult> {
    if ideas.is_empty() {
        return None;
    }

    let total = ideas.len();
    let (mut fresh, previously_used): (Vec<_>, Vec<_>) =
        ideas.into_iter().partition(|idea| !used.is_used(idea));

    let relaxed = fresh.is_empty();
    if relaxed {
        tracing::warn!(
            ideas = total,
            "every idea was used before, relaxing the dedup filter"
        );
        fresh = previously_used;
    } else {
        tracing::debug!(
            ideas = total,
            filtered = previously_used.len(),
            "dedup filter applied"
        );
    }

    fresh.sort_by(compare_ideas);

    let mut picks = fresh.into_iter();
    let chosen = picks.next()?;
    let alternates: Vec<ScoredIdea> = match mode {
        SelectionMode::Single => picks.collect(),
        SelectionMode::Batch(n) => picks.take(n.saturating_sub(1)).collect(),
    };

    tracing::info!(
        title = %chosen.title,
        score = chosen.viral_score,
        alternates = alternates.len(),
        relaxed,
        "idea selected"
    );

    Some(SelectionResult {
        chosen,
        alternates,
        selected_at: now,
        relaxed,
    })
}

/// Score descending, then earliest fetch (built-ins last), then source
/// precedence, then title.
fn compare_ideas(a: &ScoredIdea, b: &ScoredIdea) -> Ordering {
    b.viral_score
        .cmp(&a.viral_score)
        .then_with(|| {
            let fa = a.source_candidate.as_ref().map(|c| c.fetched_at);
            let fb = b.source_candidate.as_ref().map(|c| c.fetched_at);
            match (fa, fb) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
        .then_with(|| {
            let pa = a.source().map_or(usize::MAX, TrendSource::priority);
            let pb = b.source().map_or(usize::MAX, TrendSource::priority);
            pa.cmp(&pb)
        })
        .then_with(|| a.title.cmp(&b.title))
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod tests;
