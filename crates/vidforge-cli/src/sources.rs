//! Trend source check: fetch every source once and report what came back.

use chrono::Utc;
use clap::Subcommand;
use vidforge_core::{AppConfig, TrendSource};
use vidforge_ideas::{CollectReport, HttpSettings, SourceClient};

/// Sub-commands available under `sources`.
#[derive(Debug, Subcommand)]
pub enum SourcesCommands {
    /// Fetch every source once and print availability and candidate counts
    Check,
}

/// Check all six sources concurrently, including ones disabled in the
/// sources file.
///
/// # Errors
///
/// Returns an error if the sources file is invalid, the HTTP client cannot be
/// built, or no source returned a response.
pub(crate) async fn run_sources_check(config: &AppConfig) -> anyhow::Result<()> {
    let sources_file = vidforge_core::load_sources_or_default(&config.sources_path)?;
    let client =
        SourceClient::new(&HttpSettings::from_app_config(config))?.with_topic(&config.niche);

    let report = client.collect_candidates(&TrendSource::ALL, Utc::now()).await;

    println!("{:<15}{:<10}{:<12}NOTE", "SOURCE", "STATUS", "CANDIDATES");
    for row in rows(&report) {
        let note = match (row.error, sources_file.settings_for(row.source).enabled) {
            (Some(reason), _) => reason.to_owned(),
            (None, false) => "disabled in sources file".to_owned(),
            (None, true) => row.sample.unwrap_or_default().to_owned(),
        };
        println!(
            "{:<15}{:<10}{:<12}{}",
            row.source.display_name(),
            if row.error.is_some() { "down" } else { "ok" },
            row.count,
            note
        );
    }

    if report.all_unavailable() {
        anyhow::bail!("no trend source answered; check network access");
    }
    Ok(())
}

struct SourceRow<'a> {
    source: TrendSource,
    count: usize,
    /// Title of the first candidate, if any.
    sample: Option<&'a str>,
    error: Option<&'a str>,
}

fn rows(report: &CollectReport) -> Vec<SourceRow<'_>> {
    TrendSource::ALL
        .iter()
        .map(|&source| {
            let mut fetched = report.candidates.iter().filter(|c| c.source == source);
            let sample = fetched.next().map(|c| c.title.as_str());
            SourceRow {
                source,
                count: usize::from(sample.is_some()) + fetched.count(),
                sample,
                error: report
                    .unavailable
                    .iter()
                    .find(|(s, _)| *s == source)
                    .map(|(_, reason)| reason.as_str()),
            }
        })
        .collect()
}
