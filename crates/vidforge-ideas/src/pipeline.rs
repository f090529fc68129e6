//! End-to-end idea generation: collect, aggregate, optimize, select, emit.
//!
//! A run never fails. Each stage has an explicit fallback:
//!
//! - a source that errors is reported in `unavailable_sources`;
//! - no candidates at all selects from the built-in ideas;
//! - an unusable LLM yields heuristic scores (`optimized = false`);
//! - a fully used dedup log relaxes the filter (`selection.relaxed`).

use chrono::{DateTime, Utc};
use vidforge_core::{AppConfig, SourcesFile, TrendSource};

use crate::aggregator::aggregate;
use crate::dedup_log::{DedupLog, DedupSnapshot};
use crate::emitter::{emit, to_record};
use crate::error::IdeaError;
use crate::fallback::static_selection;
use crate::llm::ChatClient;
use crate::optimizer::IdeaOptimizer;
use crate::selector::{select, SelectionMode};
use crate::sources::{HttpSettings, SourceClient};
use crate::types::{IdeaRecord, SelectionResult};

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Hand-off records (chosen first). For a preview these were not logged.
    pub records: Vec<IdeaRecord>,
    pub selection: SelectionResult,
    /// Raw candidates fetched across all sources.
    pub fetched: usize,
    /// Candidates left after deduplication.
    pub ranked: usize,
    pub unavailable_sources: Vec<(TrendSource, String)>,
    /// Whether the LLM scored the candidates.
    pub optimized: bool,
    /// Whether the built-in ideas were used because no source answered.
    pub used_static_fallback: bool,
}

pub struct IdeaPipeline {
    sources: SourceClient,
    optimizer: IdeaOptimizer,
    sources_file: SourcesFile,
    niche: String,
    batch_size: usize,
}

impl IdeaPipeline {
    #[must_use]
    pub fn new(sources: SourceClient, optimizer: IdeaOptimizer, sources_file: SourcesFile) -> Self {
        Self {
            sources,
            optimizer,
            sources_file,
            niche: "coding".to_owned(),
            batch_size: 1,
        }
    }

    /// Pipeline wired from application config: production endpoints, Groq
    /// when an API key is set, heuristic scoring otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaError::Http`] if an HTTP client cannot be built.
    pub fn from_app_config(
        config: &AppConfig,
        sources_file: SourcesFile,
    ) -> Result<Self, IdeaError> {
        let sources =
            SourceClient::new(&HttpSettings::from_app_config(config))?.with_topic(&config.niche);
        let chat = ChatClient::from_app_config(config)?;
        let optimizer =
            IdeaOptimizer::new(chat, config.optimizer_top_k).with_niche(&config.niche);

        Ok(Self::new(sources, optimizer, sources_file)
            .with_niche(&config.niche)
            .with_batch_size(config.batch_size))
    }

    #[must_use]
    pub fn with_niche(mut self, niche: impl Into<String>) -> Self {
        self.niche = niche.into();
        self
    }

    /// Number of records each run emits (at least one).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Full run: the emitted records are appended to `log`.
    pub async fn run(&self, log: &mut dyn DedupLog, now: DateTime<Utc>) -> PipelineReport {
        let mut report = self.plan(&*log, now).await;
        report.records = emit(&report.selection, &self.niche, self.batch_size, log, now);
        report
    }

    /// Dry run: same selection as [`run`](Self::run), but `log` is only read.
    pub async fn preview(&self, log: &dyn DedupLog, now: DateTime<Utc>) -> PipelineReport {
        let mut report = self.plan(log, now).await;
        report.records = report
            .selection
            .picks()
            .take(self.batch_size)
            .map(|idea| to_record(idea, &self.niche, now))
            .collect();
        report
    }

    async fn plan(&self, log: &dyn DedupLog, now: DateTime<Utc>) -> PipelineReport {
        let enabled = self.sources_file.enabled_sources();
        let collected = self.sources.collect_candidates(&enabled, now).await;
        let fetched = collected.candidates.len();
        let unavailable_sources = collected.unavailable;

        let ranked = aggregate(collected.candidates, &self.sources_file, now);
        let ranked_len = ranked.len();

        let snapshot = log.snapshot().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "dedup log unreadable, selecting without it");
            DedupSnapshot::default()
        });
        let mode = SelectionMode::for_count(self.batch_size);

        if ranked.is_empty() {
            tracing::warn!(
                unavailable = unavailable_sources.len(),
                "no trend candidates available, using built-in ideas"
            );
            return PipelineReport {
                records: Vec::new(),
                selection: static_selection(&snapshot, mode, now),
                fetched,
                ranked: 0,
                unavailable_sources,
                optimized: false,
                used_static_fallback: true,
            };
        }

        let outcome = self.optimizer.optimize(&ranked).await;
        let optimized = outcome.is_optimized();

        let (selection, used_static_fallback) =
            match select(outcome.into_ideas(), &snapshot, mode, now) {
                Some(selection) => (selection, false),
                None => (static_selection(&snapshot, mode, now), true),
            };

        PipelineReport {
            records: Vec::new(),
            selection,
            fetched,
            ranked: ranked_len,
            unavailable_sources,
            optimized,
            used_static_fallback,
        }
    }
}
