use vidforge_core::AppConfig;
use vidforge_ideas::{DedupEntry, DedupLog, FileDedupLog};

/// Print the `limit` most recent dedup-log entries, newest first.
///
/// # Errors
///
/// Returns an error if the dedup log exists but cannot be read.
pub(crate) fn run_ideas_history(config: &AppConfig, limit: usize) -> anyhow::Result<()> {
    let log = FileDedupLog::new(&config.dedup_log_path);
    let entries = log.entries()?;

    if entries.is_empty() {
        println!(
            "no ideas chosen yet ({}); run `ideas generate` first",
            log.path().display()
        );
        return Ok(());
    }

    println!("{:<22}TITLE / KEYWORDS", "CHOSEN AT");
    for entry in recent(&entries, limit) {
        println!(
            "{:<22}{}",
            entry.chosen_at.format("%Y-%m-%d %H:%M UTC"),
            entry.normalized_title
        );
        if !entry.keywords.is_empty() {
            println!("{:<22}[{}]", "", entry.keywords.join(", "));
        }
    }
    Ok(())
}

/// Last `limit` entries in reverse order.
fn recent(entries: &[DedupEntry], limit: usize) -> impl Iterator<Item = &DedupEntry> {
    entries.iter().rev().take(limit)
}
