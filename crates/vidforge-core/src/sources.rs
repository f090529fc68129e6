//! Trend source vocabulary and the per-source ranking table.
//!
//! Popularity signals are not comparable across sources (GitHub stars vs.
//! Reddit upvotes vs. Stack Overflow question counts), so every source carries
//! a `scale`: the signal value that maps to a normalized popularity of 1.0.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One of the six trend feeds. Declaration order is the tie-break precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendSource {
    Github,
    HackerNews,
    DevTo,
    Reddit,
    StackOverflow,
    TechNews,
}

impl TrendSource {
    /// All sources, in precedence order.
    pub const ALL: [TrendSource; 6] = [
        TrendSource::Github,
        TrendSource::HackerNews,
        TrendSource::DevTo,
        TrendSource::Reddit,
        TrendSource::StackOverflow,
        TrendSource::TechNews,
    ];

    /// Stable machine name, identical to the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrendSource::Github => "github",
            TrendSource::HackerNews => "hackernews",
            TrendSource::DevTo => "devto",
            TrendSource::Reddit => "reddit",
            TrendSource::StackOverflow => "stackoverflow",
            TrendSource::TechNews => "technews",
        }
    }

    /// Human-readable feed name for reports.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            TrendSource::Github => "GitHub Trending",
            TrendSource::HackerNews => "HackerNews",
            TrendSource::DevTo => "Dev.to",
            TrendSource::Reddit => "Reddit r/programming",
            TrendSource::StackOverflow => "Stack Overflow",
            TrendSource::TechNews => "Tech News Trends",
        }
    }

    /// 0-based position in the precedence list; lower wins ties.
    #[must_use]
    pub fn priority(self) -> usize {
        match self {
            TrendSource::Github => 0,
            TrendSource::HackerNews => 1,
            TrendSource::DevTo => 2,
            TrendSource::Reddit => 3,
            TrendSource::StackOverflow => 4,
            TrendSource::TechNews => 5,
        }
    }

    /// Signal value that saturates normalized popularity at 1.0.
    #[must_use]
    pub fn default_scale(self) -> f64 {
        match self {
            TrendSource::Github => 100_000.0,
            TrendSource::HackerNews => 1_000.0,
            TrendSource::DevTo => 500.0,
            TrendSource::Reddit => 10_000.0,
            TrendSource::StackOverflow => 2_500_000.0,
            TrendSource::TechNews => 100.0,
        }
    }
}

impl std::fmt::Display for TrendSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        TrendSource::ALL
            .into_iter()
            .find(|source| source.as_str() == needle)
            .ok_or_else(|| ConfigError::Validation(format!("unknown trend source '{s}'")))
    }
}

/// Linear weighting of popularity and recency used by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_popularity_weight")]
    pub popularity_weight: f64,
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,
    #[serde(default = "default_half_life_hours")]
    pub recency_half_life_hours: f64,
}

fn default_popularity_weight() -> f64 {
    0.7
}

fn default_recency_weight() -> f64 {
    0.3
}

fn default_half_life_hours() -> f64 {
    48.0
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            popularity_weight: default_popularity_weight(),
            recency_weight: default_recency_weight(),
            recency_half_life_hours: default_half_life_hours(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub source: TrendSource,
    pub scale: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl SourceSettings {
    #[must_use]
    pub fn default_for(source: TrendSource) -> Self {
        Self {
            source,
            scale: source.default_scale(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourcesFile {
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub sources: Vec<SourceSettings>,
}

impl SourcesFile {
    /// Settings for `source`, falling back to built-in defaults when the file
    /// does not mention it.
    #[must_use]
    pub fn settings_for(&self, source: TrendSource) -> SourceSettings {
        self.sources
            .iter()
            .find(|s| s.source == source)
            .cloned()
            .unwrap_or_else(|| SourceSettings::default_for(source))
    }

    #[must_use]
    pub fn scale_for(&self, source: TrendSource) -> f64 {
        self.settings_for(source).scale
    }

    /// Enabled sources in precedence order.
    #[must_use]
    pub fn enabled_sources(&self) -> Vec<TrendSource> {
        TrendSource::ALL
            .into_iter()
            .filter(|s| self.settings_for(*s).enabled)
            .collect()
    }
}

/// Load and validate the sources table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile = serde_yaml::from_str(&content)?;
    validate_sources(&sources_file)?;

    Ok(sources_file)
}

/// Like [`load_sources`], but a missing file yields the built-in defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_sources_or_default(path: &Path) -> Result<SourcesFile, ConfigError> {
    if path.exists() {
        load_sources(path)
    } else {
        Ok(SourcesFile::default())
    }
}

fn validate_sources(file: &SourcesFile) -> Result<(), ConfigError> {
    let ranking = &file.ranking;
    for (name, weight) in [
        ("popularity_weight", ranking.popularity_weight),
        ("recency_weight", ranking.recency_weight),
    ] {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::Validation(format!(
                "ranking.{name} must be a non-negative number, got {weight}"
            )));
        }
    }
    if ranking.popularity_weight + ranking.recency_weight <= 0.0 {
        return Err(ConfigError::Validation(
            "ranking weights must not both be zero".to_string(),
        ));
    }
    if !ranking.recency_half_life_hours.is_finite() || ranking.recency_half_life_hours <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "ranking.recency_half_life_hours must be positive, got {}",
            ranking.recency_half_life_hours
        )));
    }

    let mut seen = HashSet::new();
    for settings in &file.sources {
        if !seen.insert(settings.source) {
            return Err(ConfigError::Validation(format!(
                "duplicate source entry: '{}'",
                settings.source
            )));
        }
        if !settings.scale.is_finite() || settings.scale <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "source '{}' has invalid scale {}; must be positive",
                settings.source, settings.scale
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
