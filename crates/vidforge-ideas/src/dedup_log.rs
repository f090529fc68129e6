//! Record of previously chosen ideas, so runs do not repeat themselves.
//!
//! The log is passed explicitly to the selector and emitter. The file-backed
//! implementation is an append-only JSON Lines file; every line is one
//! [`DedupEntry`].

use std::collections::{BTreeSet, HashSet};
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::IdeaError;
use crate::text::{normalize_keywords, normalize_title};
use crate::types::{DedupEntry, ScoredIdea};

/// Smallest keyword set that counts as a match on its own.
const MIN_MATCH_KEYWORDS: usize = 2;

impl DedupEntry {
    /// Entry for an idea chosen at `chosen_at`.
    #[must_use]
    pub fn for_idea(idea: &ScoredIdea, chosen_at: DateTime<Utc>) -> Self {
        Self {
            normalized_title: normalize_title(&idea.title),
            keywords: normalize_keywords(&idea.keywords).into_iter().collect(),
            source_title: source_title(idea),
            chosen_at,
        }
    }
}

/// Point-in-time view of the log, read once per selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupSnapshot {
    titles: HashSet<String>,
    source_titles: HashSet<String>,
    keyword_sets: HashSet<BTreeSet<String>>,
}

impl DedupSnapshot {
    #[must_use]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a DedupEntry>) -> Self {
        let mut snapshot = Self::default();
        for entry in entries {
            snapshot.titles.insert(normalize_title(&entry.normalized_title));
            if let Some(source) = entry
                .source_title
                .as_deref()
                .map(normalize_title)
                .filter(|t| !t.is_empty())
            {
                snapshot.source_titles.insert(source);
            }
            let keywords = normalize_keywords(&entry.keywords);
            if keywords.len() >= MIN_MATCH_KEYWORDS {
                snapshot.keyword_sets.insert(keywords);
            }
        }
        snapshot
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// An idea is used when its normalized title was logged before, when the
    /// trend candidate behind it was already turned into a logged idea, or
    /// when its keyword set of two or more keywords equals a logged one.
    #[must_use]
    pub fn is_used(&self, idea: &ScoredIdea) -> bool {
        if self.titles.contains(&normalize_title(&idea.title)) {
            return true;
        }
        if let Some(source) = source_title(idea) {
            if self.source_titles.contains(&source) || self.titles.contains(&source) {
                return true;
            }
        }
        let keywords = normalize_keywords(&idea.keywords);
        keywords.len() >= MIN_MATCH_KEYWORDS && self.keyword_sets.contains(&keywords)
    }
}

fn source_title(idea: &ScoredIdea) -> Option<String> {
    idea.source_candidate
        .as_ref()
        .map(|c| normalize_title(&c.title))
        .filter(|t| !t.is_empty())
}

/// Storage for chosen ideas.
pub trait DedupLog: Send + Sync {
    /// All entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaError`] if the backing store cannot be read.
    fn entries(&self) -> Result<Vec<DedupEntry>, IdeaError>;

    /// # Errors
    ///
    /// Returns [`IdeaError`] if the backing store cannot be written.
    fn append(&mut self, entry: DedupEntry) -> Result<(), IdeaError>;

    /// # Errors
    ///
    /// Returns [`IdeaError`] if the backing store cannot be read.
    fn snapshot(&self) -> Result<DedupSnapshot, IdeaError> {
        Ok(DedupSnapshot::from_entries(&self.entries()?))
    }
}

/// JSON Lines file. A missing file is an empty log; lines that fail to parse
/// are skipped with a warning.
#[derive(Debug, Clone)]
pub struct FileDedupLog {
    path: PathBuf,
}

impl FileDedupLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DedupLog for FileDedupLog {
    fn entries(&self) -> Result<Vec<DedupEntry>, IdeaError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(IdeaError::DedupLog(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        let mut entries = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<DedupEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = line_no + 1,
                    error = %e,
                    "skipping malformed dedup log line"
                ),
            }
        }
        Ok(entries)
    }

    fn append(&mut self, entry: DedupEntry) -> Result<(), IdeaError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(&entry).map_err(|e| IdeaError::DedupLog(e.to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

/// In-memory log, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryDedupLog {
    entries: Vec<DedupEntry>,
}

impl MemoryDedupLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entries(entries: Vec<DedupEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DedupLog for MemoryDedupLog {
    fn entries(&self) -> Result<Vec<DedupEntry>, IdeaError> {
        Ok(self.entries.clone())
    }

    fn append(&mut self, entry: DedupEntry) -> Result<(), IdeaError> {
        self.entries.push(entry);
        Ok(())
    }
}
