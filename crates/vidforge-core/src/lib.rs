//! Shared configuration and domain vocabulary for vidforge.

mod app_config;
mod config;
mod error;
mod sources;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use sources::{
    load_sources, load_sources_or_default, RankingConfig, SourceSettings, SourcesFile,
    TrendSource,
};
