use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use vidforge_core::AppConfig;
use vidforge_ideas::{FileDedupLog, IdeaPipeline};

use super::build_pipeline;
use super::generate::write_records;

/// Run the pipeline on `cron` (or `VIDFORGE_SCHEDULE_CRON`) until Ctrl-C.
///
/// A tick that fires while the previous run is still going is skipped.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built, the cron expression is
/// invalid, or the scheduler fails to start or stop.
pub(crate) async fn run_ideas_schedule(
    config: &AppConfig,
    cron: Option<String>,
    count: Option<usize>,
) -> anyhow::Result<()> {
    let schedule = cron.unwrap_or_else(|| config.schedule_cron.clone());
    let pipeline = Arc::new(build_pipeline(config, count)?);
    let log = Arc::new(Mutex::new(FileDedupLog::new(&config.dedup_log_path)));
    let output = Arc::new(config.output_path.clone());

    let mut scheduler = JobScheduler::new().await?;
    scheduler
        .add(generate_job(&schedule, pipeline, log, output)?)
        .await?;
    scheduler.start().await?;
    tracing::info!(cron = %schedule, "scheduler started; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("received Ctrl-C, shutting down scheduler");
    scheduler.shutdown().await?;
    Ok(())
}

fn generate_job(
    schedule: &str,
    pipeline: Arc<IdeaPipeline>,
    log: Arc<Mutex<FileDedupLog>>,
    output: Arc<PathBuf>,
) -> Result<Job, JobSchedulerError> {
    Job::new_async(schedule, move |_uuid, _lock| {
        let pipeline = Arc::clone(&pipeline);
        let log = Arc::clone(&log);
        let output = Arc::clone(&output);

        Box::pin(async move {
            let Ok(mut log) = log.try_lock() else {
                tracing::warn!("scheduler: previous idea run still in progress; skipping tick");
                return;
            };

            tracing::info!("scheduler: starting idea generation run");
            let report = pipeline.run(&mut *log, Utc::now()).await;
            if let Err(e) = write_records(&output, &report.records) {
                tracing::error!(error = %e, "scheduler: failed to write ideas");
                return;
            }
            tracing::info!(
                records = report.records.len(),
                optimized = report.optimized,
                static_fallback = report.used_static_fallback,
                "scheduler: idea generation run complete"
            );
        })
    })
}
