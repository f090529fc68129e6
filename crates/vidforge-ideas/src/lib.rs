//! Trend-driven idea generation for short-form coding videos.
//!
//! Fetches trending topics from six public feeds, ranks and deduplicates
//! them, asks an LLM to turn the best into video concepts, and picks the
//! idea(s) to hand off to script generation.

pub mod aggregator;
pub mod dedup_log;
pub mod emitter;
pub mod error;
pub mod fallback;
pub mod llm;
pub mod optimizer;
pub mod pipeline;
mod retry;
pub mod selector;
pub mod sources;
pub mod text;
pub mod types;

pub use aggregator::aggregate;
pub use dedup_log::{DedupLog, DedupSnapshot, FileDedupLog, MemoryDedupLog};
pub use emitter::emit;
pub use error::IdeaError;
pub use fallback::static_ideas;
pub use llm::ChatClient;
pub use optimizer::{IdeaOptimizer, OptimizeOutcome};
pub use pipeline::{IdeaPipeline, PipelineReport};
pub use selector::{select, SelectionMode};
pub use sources::{CollectReport, FetchOutcome, HttpSettings, SourceClient, SourceEndpoints};
pub use types::{
    DedupEntry, IdeaRecord, RankedCandidate, RawCandidate, ScoredIdea, SelectionResult,
};
