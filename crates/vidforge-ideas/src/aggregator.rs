//! Candidate aggregation: normalize, deduplicate and rank across sources.
//!
//! Popularity signals are log-scaled against each source's `scale` so that a
//! GitHub star count and a Lobsters score land on the same `[0, 1]` axis.
//! Recency decays exponentially with the configured half-life. The final
//! score is a weighted mean of the two.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use vidforge_core::{RankingConfig, SourcesFile};

use crate::text::{compact_title, normalize_title};
use crate::types::{RawCandidate, RankedCandidate};

/// Log-scaled popularity: `ln(1 + signal) / ln(1 + scale)`, clamped to `[0, 1]`.
#[must_use]
pub fn normalized_popularity(signal: f64, scale: f64) -> f64 {
    if !signal.is_finite() || signal <= 0.0 || !scale.is_finite() || scale <= 0.0 {
        return 0.0;
    }
    (signal.ln_1p() / scale.ln_1p()).clamp(0.0, 1.0)
}

/// Exponential decay: 1.0 for brand-new items, 0.5 after one half-life.
#[must_use]
pub fn recency_factor(published: DateTime<Utc>, now: DateTime<Utc>, half_life_hours: f64) -> f64 {
    if half_life_hours <= 0.0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let age_hours = ((now - published).num_seconds().max(0) as f64) / 3600.0;
    0.5_f64.powf(age_hours / half_life_hours).clamp(0.0, 1.0)
}

/// Weighted mean of popularity and recency.
#[must_use]
pub fn combined_score(popularity: f64, recency: f64, ranking: &RankingConfig) -> f64 {
    let total = ranking.popularity_weight + ranking.recency_weight;
    if total <= 0.0 {
        return popularity;
    }
    (ranking.popularity_weight * popularity + ranking.recency_weight * recency) / total
}

/// Rank `candidates` and drop near-exact duplicates, keeping the best-ranked
/// member of each duplicate group.
///
/// Order: score descending, then source precedence, then earliest fetch,
/// then normalized title.
#[must_use]
pub fn aggregate(
    candidates: Vec<RawCandidate>,
    sources: &SourcesFile,
    now: DateTime<Utc>,
) -> Vec<RankedCandidate> {
    let ranking = &sources.ranking;
    let input_len = candidates.len();

    let mut scored: Vec<RankedCandidate> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let normalized_title = normalize_title(&candidate.title);
            if normalized_title.is_empty() {
                return None;
            }
            let popularity = normalized_popularity(
                candidate.popularity_signal,
                sources.scale_for(candidate.source),
            );
            let recency = recency_factor(
                candidate.published_at.unwrap_or(candidate.fetched_at),
                now,
                ranking.recency_half_life_hours,
            );
            let score = combined_score(popularity, recency, ranking);
            Some(RankedCandidate {
                candidate,
                normalized_title,
                popularity,
                recency,
                score,
                rank: 0,
            })
        })
        .collect();

    scored.sort_by(compare_ranked);

    // Equal normalized titles always share a compact form, so one set covers both.
    let mut seen_compact = HashSet::new();
    let mut ranked = Vec::with_capacity(scored.len());
    for mut entry in scored {
        let compact = compact_title(&entry.normalized_title);
        if !seen_compact.insert(compact) {
            tracing::debug!(
                source = entry.candidate.source.as_str(),
                title = %entry.candidate.title,
                "dropping duplicate candidate"
            );
            continue;
        }
        entry.rank = ranked.len();
        ranked.push(entry);
    }

    tracing::info!(
        input = input_len,
        ranked = ranked.len(),
        "aggregated trend candidates"
    );
    ranked
}

fn compare_ranked(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| {
            a.candidate
                .source
                .priority()
                .cmp(&b.candidate.source.priority())
        })
        .then_with(|| a.candidate.fetched_at.cmp(&b.candidate.fetched_at))
        .then_with(|| a.normalized_title.cmp(&b.normalized_title))
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod tests;
