//! AI optimizer: turns the top ranked candidates into scored video concepts.
//!
//! One prompt covers the whole batch. When the LLM is not configured or the
//! call fails, every candidate gets a deterministic heuristic score instead,
//! kept strictly below the optimizer's band so the two never mix up.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Deserialize;

use crate::error::IdeaError;
use crate::llm::{extract_json_object, ChatClient};
use crate::text::{normalize_keyword, normalize_keywords, title_keywords};
use crate::types::{RankedCandidate, ScoredIdea};

/// Inclusive band for optimizer-produced scores.
pub const OPTIMIZED_SCORE_MIN: u8 = 85;
pub const OPTIMIZED_SCORE_MAX: u8 = 99;
/// Inclusive band for heuristic scores.
pub const FALLBACK_SCORE_MIN: u8 = 60;
pub const FALLBACK_SCORE_MAX: u8 = 84;

const TOKENS_PER_IDEA: u32 = 300;
const BASE_TOKENS: u32 = 200;
const MAX_TOKENS: u32 = 8192;

/// Result of one optimizer pass.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeOutcome {
    Optimized(Vec<ScoredIdea>),
    /// The LLM could not be used; `fallback` holds heuristic ideas for the
    /// same candidates.
    Unavailable {
        reason: String,
        fallback: Vec<ScoredIdea>,
    },
}

impl OptimizeOutcome {
    #[must_use]
    pub fn is_optimized(&self) -> bool {
        matches!(self, OptimizeOutcome::Optimized(_))
    }

    #[must_use]
    pub fn into_ideas(self) -> Vec<ScoredIdea> {
        match self {
            OptimizeOutcome::Optimized(ideas) => ideas,
            OptimizeOutcome::Unavailable { fallback, .. } => fallback,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdeaBatch {
    #[serde(default)]
    ideas: Vec<LlmIdea>,
}

#[derive(Debug, Deserialize)]
struct LlmIdea {
    index: Option<serde_json::Value>,
    title: Option<String>,
    hook: Option<String>,
    keywords: Option<serde_json::Value>,
    keyword: Option<String>,
    viral_score: Option<serde_json::Value>,
}

pub struct IdeaOptimizer {
    client: Option<ChatClient>,
    top_k: usize,
    niche: String,
}

impl IdeaOptimizer {
    /// `client = None` means heuristic scoring only.
    #[must_use]
    pub fn new(client: Option<ChatClient>, top_k: usize) -> Self {
        Self {
            client,
            top_k: top_k.max(1),
            niche: "coding".to_owned(),
        }
    }

    #[must_use]
    pub fn with_niche(mut self, niche: impl Into<String>) -> Self {
        self.niche = niche.into();
        self
    }

    /// Score the first `top_k` candidates. Never fails: a missing client or a
    /// failed call yields [`OptimizeOutcome::Unavailable`] with heuristic ideas.
    pub async fn optimize(&self, ranked: &[RankedCandidate]) -> OptimizeOutcome {
        let batch = &ranked[..ranked.len().min(self.top_k)];
        if batch.is_empty() {
            return OptimizeOutcome::Optimized(Vec::new());
        }

        let Some(client) = &self.client else {
            tracing::info!("no LLM configured, scoring candidates heuristically");
            return OptimizeOutcome::Unavailable {
                reason: "no LLM API key configured".to_owned(),
                fallback: heuristic_ideas(batch),
            };
        };

        match self.optimize_with(client, batch).await {
            Ok(ideas) => {
                let optimized = ideas.iter().filter(|i| i.optimized).count();
                tracing::info!(
                    candidates = batch.len(),
                    optimized,
                    model = client.model(),
                    "optimizer scored candidates"
                );
                OptimizeOutcome::Optimized(ideas)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    candidates = batch.len(),
                    "optimizer unavailable, falling back to heuristic scores"
                );
                OptimizeOutcome::Unavailable {
                    reason: e.to_string(),
                    fallback: heuristic_ideas(batch),
                }
            }
        }
    }

    async fn optimize_with(
        &self,
        client: &ChatClient,
        batch: &[RankedCandidate],
    ) -> Result<Vec<ScoredIdea>, IdeaError> {
        let prompt = build_prompt(&self.niche, batch);
        let reply = client.complete(&prompt, max_tokens_for(batch.len())).await?;
        apply_reply(&reply, batch)
    }
}

fn max_tokens_for(batch_len: usize) -> u32 {
    let n = u32::try_from(batch_len).unwrap_or(u32::MAX);
    BASE_TOKENS
        .saturating_add(TOKENS_PER_IDEA.saturating_mul(n))
        .min(MAX_TOKENS)
}

fn build_prompt(niche: &str, batch: &[RankedCandidate]) -> String {
    let mut prompt = format!(
        "You are a YouTube Shorts strategist for {niche}/tech content.\n\
         Turn each trending topic below into a viral short-video concept.\n\n\
         Topics:\n"
    );
    for (i, ranked) in batch.iter().enumerate() {
        let c = &ranked.candidate;
        let _ = write!(
            prompt,
            "{}. [{}] {}",
            i + 1,
            c.source.display_name(),
            c.title
        );
        if let Some(description) = &c.description {
            let _ = write!(prompt, " | {description}");
        }
        if !c.tags.is_empty() {
            let _ = write!(prompt, " | tags: {}", c.tags.join(", "));
        }
        prompt.push('\n');
    }
    prompt.push_str(
        "\nReturn ONLY a JSON object (no markdown, no extra text) of the form:\n\
         {\"ideas\": [{\"index\": <topic number>, \
         \"title\": \"compelling 50-60 char video title\", \
         \"hook\": \"attention-grabbing opening line, 100 chars max\", \
         \"keywords\": [\"primary SEO keyword\", \"...\"], \
         \"viral_score\": <integer 85-99>}]}\n\
         Include one entry per topic.",
    );
    prompt
}

/// Merge the LLM reply into the batch. Candidates the reply skips get the
/// heuristic individually; a reply with no usable entry is an error.
fn apply_reply(reply: &str, batch: &[RankedCandidate]) -> Result<Vec<ScoredIdea>, IdeaError> {
    let json = extract_json_object(reply)
        .ok_or_else(|| IdeaError::Llm("reply contains no JSON object".to_owned()))?;
    let parsed: IdeaBatch = serde_json::from_str(json).map_err(|e| IdeaError::Deserialize {
        context: "optimizer reply".to_owned(),
        source: e,
    })?;

    let mut slots: Vec<Option<ScoredIdea>> = vec![None; batch.len()];
    for (position, idea) in parsed.ideas.into_iter().enumerate() {
        let index = idea
            .index
            .as_ref()
            .and_then(as_number)
            .map_or(Some(position), |i| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let i = i.round() as usize;
                i.checked_sub(1)
            });
        let Some(index) = index.filter(|i| *i < batch.len()) else {
            tracing::debug!(position, "ignoring optimizer entry with bad index");
            continue;
        };
        if slots[index].is_some() {
            continue;
        }
        slots[index] = Some(optimized_idea(idea, &batch[index]));
    }

    if slots.iter().all(Option::is_none) {
        return Err(IdeaError::Llm("reply contains no usable ideas".to_owned()));
    }

    let n = batch.len();
    Ok(slots
        .into_iter()
        .enumerate()
        .map(|(r, slot)| slot.unwrap_or_else(|| heuristic_idea(&batch[r], r, n)))
        .collect())
}

fn optimized_idea(idea: LlmIdea, ranked: &RankedCandidate) -> ScoredIdea {
    let candidate = &ranked.candidate;
    let title = idea
        .title
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| candidate.title.clone());
    let hook = idea
        .hook
        .map(|h| h.trim().to_owned())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| fallback_hook(&candidate.title));

    let mut keywords = idea.keywords.map(keywords_from_value).unwrap_or_default();
    keywords.extend(idea.keyword.as_deref().and_then(normalize_keyword));
    if keywords.is_empty() {
        keywords = candidate_keywords(ranked);
    }

    let viral_score = idea
        .viral_score
        .as_ref()
        .and_then(as_number)
        .map_or(OPTIMIZED_SCORE_MIN, clamp_optimized);

    ScoredIdea {
        title,
        hook,
        keywords,
        viral_score,
        source_candidate: Some(candidate.clone()),
        optimized: true,
    }
}

fn keywords_from_value(value: serde_json::Value) -> BTreeSet<String> {
    match value {
        serde_json::Value::Array(items) => {
            normalize_keywords(items.iter().filter_map(serde_json::Value::as_str))
        }
        serde_json::Value::String(s) => normalize_keywords(s.split(',')),
        _ => BTreeSet::new(),
    }
}

/// A JSON number or numeric string.
fn as_number(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_optimized(score: f64) -> u8 {
    score
        .round()
        .clamp(f64::from(OPTIMIZED_SCORE_MIN), f64::from(OPTIMIZED_SCORE_MAX)) as u8
}

/// Heuristic score for the candidate at rank `rank` of `n`: 84 for the best,
/// 60 for the worst, linear in between.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn heuristic_score(rank: usize, n: usize) -> u8 {
    let span = f64::from(FALLBACK_SCORE_MAX - FALLBACK_SCORE_MIN);
    let step = (span * rank as f64 / n.saturating_sub(1).max(1) as f64).round();
    (f64::from(FALLBACK_SCORE_MAX) - step).clamp(
        f64::from(FALLBACK_SCORE_MIN),
        f64::from(FALLBACK_SCORE_MAX),
    ) as u8
}

/// Heuristic ideas for a whole batch, in rank order.
#[must_use]
pub fn heuristic_ideas(batch: &[RankedCandidate]) -> Vec<ScoredIdea> {
    let n = batch.len();
    batch
        .iter()
        .enumerate()
        .map(|(r, ranked)| heuristic_idea(ranked, r, n))
        .collect()
}

fn heuristic_idea(ranked: &RankedCandidate, rank: usize, n: usize) -> ScoredIdea {
    let candidate = &ranked.candidate;
    ScoredIdea {
        title: candidate.title.clone(),
        hook: fallback_hook(&candidate.title),
        keywords: candidate_keywords(ranked),
        viral_score: heuristic_score(rank, n),
        source_candidate: Some(candidate.clone()),
        optimized: false,
    }
}

fn fallback_hook(title: &str) -> String {
    format!("Breaking: {title} is changing everything...")
}

fn candidate_keywords(ranked: &RankedCandidate) -> BTreeSet<String> {
    let from_tags = normalize_keywords(&ranked.candidate.tags);
    if from_tags.is_empty() {
        title_keywords(&ranked.candidate.title)
    } else {
        from_tags
    }
}

#[cfg(test)]
#[path = "optimizer_test.rs"]
mod tests;
