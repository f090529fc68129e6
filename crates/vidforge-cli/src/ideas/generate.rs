use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use vidforge_core::{AppConfig, TrendSource};
use vidforge_ideas::{FileDedupLog, IdeaRecord, PipelineReport};

use super::build_pipeline;

/// Run the pipeline once.
///
/// With `dry_run` the picks are printed to stdout as JSON and nothing is
/// written: the dedup log is read but not appended, and the output file is
/// left alone. The run summary goes to stderr so stdout stays parseable.
///
/// # Errors
///
/// Returns an error if the config or sources file is invalid, an HTTP client
/// cannot be built, or the output file cannot be written.
pub(crate) async fn run_ideas_generate(
    config: &AppConfig,
    count: Option<usize>,
    output: Option<PathBuf>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config, count)?;
    let mut log = FileDedupLog::new(&config.dedup_log_path);
    let now = Utc::now();

    if dry_run {
        let report = pipeline.preview(&log, now).await;
        return write_dry_run(&report, &mut std::io::stdout(), &mut std::io::stderr());
    }

    let report = pipeline.run(&mut log, now).await;
    write_summary(&report, &mut std::io::stdout())?;

    let output = output.unwrap_or_else(|| config.output_path.clone());
    write_records(&output, &report.records)?;
    println!(
        "wrote {} idea(s) to {}",
        report.records.len(),
        output.display()
    );
    Ok(())
}

/// Records as JSON on `stdout`; summary and notice on `stderr`.
fn write_dry_run(
    report: &PipelineReport,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> anyhow::Result<()> {
    write_summary(report, stderr)?;
    writeln!(stdout, "{}", serde_json::to_string_pretty(&report.records)?)?;
    writeln!(stderr, "dry-run: nothing written")?;
    Ok(())
}

fn write_summary(report: &PipelineReport, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(
        out,
        "fetched {} candidates, {} after dedup, {} source(s) unavailable",
        report.fetched,
        report.ranked,
        report.unavailable_sources.len()
    )?;
    for (source, reason) in &report.unavailable_sources {
        writeln!(out, "  {source}: {reason}")?;
    }
    if report.used_static_fallback {
        writeln!(out, "no trend candidates; chose from the built-in ideas")?;
    } else if !report.optimized {
        writeln!(out, "LLM unavailable; scores are heuristic")?;
    }
    if report.selection.relaxed {
        writeln!(out, "every idea was used before; dedup filter relaxed")?;
    }

    writeln!(out, "{:<6}{:<10}TITLE", "SCORE", "SOURCE")?;
    for record in &report.records {
        let source = record.source.map_or("builtin", TrendSource::as_str);
        writeln!(out, "{:<6}{:<10}{}", record.viral_score, source, record.title)?;
    }
    Ok(())
}

/// Write `records` as a pretty-printed JSON array, creating parent directories.
pub(crate) fn write_records(path: &Path, records: &[IdeaRecord]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!("failed to create directory {}: {e}", parent.display())
        })?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    Ok(())
}
