mod ideas;
mod sources;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::ideas::IdeasCommands;
use crate::sources::SourcesCommands;

#[derive(Debug, Parser)]
#[command(name = "vidforge")]
#[command(about = "Trend-driven idea generation for short coding videos")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate, review and schedule video ideas
    Ideas {
        #[command(subcommand)]
        command: IdeasCommands,
    },
    /// Check the trend sources
    Sources {
        #[command(subcommand)]
        command: SourcesCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = vidforge_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Ideas { command }) => match command {
            IdeasCommands::Generate {
                count,
                output,
                dry_run,
            } => ideas::run_ideas_generate(&config, count, output, dry_run).await,
            IdeasCommands::History { limit } => ideas::run_ideas_history(&config, limit),
            IdeasCommands::Schedule { cron, count } => {
                ideas::run_ideas_schedule(&config, cron, count).await
            }
        },
        Some(Commands::Sources { command }) => match command {
            SourcesCommands::Check => sources::run_sources_check(&config).await,
        },
        None => {
            println!("nothing to do; try `vidforge ideas generate` or `vidforge --help`");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
