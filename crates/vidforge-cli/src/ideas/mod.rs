//! Idea command handlers for the CLI.
//!
//! Every handler builds its pipeline from `AppConfig` and the sources file.
//! Pipeline runs never fail; only I/O on the output and log files does.

mod generate;
mod history;
mod schedule;

use std::path::PathBuf;

use clap::Subcommand;

pub(crate) use generate::run_ideas_generate;
pub(crate) use history::run_ideas_history;
pub(crate) use schedule::run_ideas_schedule;

/// Sub-commands available under `ideas`.
#[derive(Debug, Subcommand)]
pub enum IdeasCommands {
    /// Run the pipeline once and write the chosen ideas
    Generate {
        /// Number of ideas to emit (defaults to VIDFORGE_BATCH_SIZE)
        #[arg(long)]
        count: Option<usize>,
        /// Output file (defaults to VIDFORGE_OUTPUT_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the would-be picks without writing files or the dedup log
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the most recently chosen ideas
    History {
        /// Maximum number of entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Run the pipeline on a cron schedule until Ctrl-C
    Schedule {
        /// Six-field cron expression (defaults to VIDFORGE_SCHEDULE_CRON)
        #[arg(long)]
        cron: Option<String>,
        /// Number of ideas per run (defaults to VIDFORGE_BATCH_SIZE)
        #[arg(long)]
        count: Option<usize>,
    },
}

/// Pipeline from config, with an optional per-invocation batch size.
fn build_pipeline(
    config: &vidforge_core::AppConfig,
    count: Option<usize>,
) -> anyhow::Result<vidforge_ideas::IdeaPipeline> {
    let sources_file = vidforge_core::load_sources_or_default(&config.sources_path)?;
    let pipeline = vidforge_ideas::IdeaPipeline::from_app_config(config, sources_file)?;
    Ok(match count {
        Some(count) => pipeline.with_batch_size(count),
        None => pipeline,
    })
}
