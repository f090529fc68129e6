//! Turn a selection into hand-off records and remember what was chosen.

use chrono::{DateTime, Utc};

use crate::dedup_log::DedupLog;
use crate::text::{idea_id, normalize_title};
use crate::types::{DedupEntry, IdeaRecord, ScoredIdea, SelectionResult};

/// Record for one idea.
#[must_use]
pub fn to_record(idea: &ScoredIdea, niche: &str, generated_at: DateTime<Utc>) -> IdeaRecord {
    let normalized = normalize_title(&idea.title);
    IdeaRecord {
        id: idea_id(&normalized),
        title: idea.title.clone(),
        hook: idea.hook.clone(),
        keywords: idea.keywords.iter().cloned().collect(),
        viral_score: idea.viral_score.min(100),
        niche: niche.to_owned(),
        optimized: idea.optimized,
        source: idea.source(),
        url: idea.source_candidate.as_ref().and_then(|c| c.url.clone()),
        generated_at,
    }
}

/// Records for the first `count` picks (chosen first), each appended to `log`.
///
/// A failed append is logged and skipped; the records are returned regardless.
pub fn emit(
    selection: &SelectionResult,
    niche: &str,
    count: usize,
    log: &mut dyn DedupLog,
    now: DateTime<Utc>,
) -> Vec<IdeaRecord> {
    let mut records = Vec::new();
    for idea in selection.picks().take(count.max(1)) {
        let record = to_record(idea, niche, now);
        if let Err(e) = log.append(DedupEntry::for_idea(idea, now)) {
            tracing::warn!(
                id = %record.id,
                error = %e,
                "failed to append to dedup log"
            );
        }
        records.push(record);
    }

    tracing::info!(count = records.len(), niche, "emitted idea records");
    records
}
