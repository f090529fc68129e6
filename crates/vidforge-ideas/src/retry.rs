//! Retry with exponential back-off and jitter for individual HTTP calls.
//!
//! [`retry_with_backoff`] wraps one fallible request and retries it on
//! transient errors (connection failures, 5xx, 429). Timeouts are never
//! retried: a timed-out call is a failure handed to the caller's fallback.

use std::future::Future;
use std::time::Duration;

use crate::error::IdeaError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** connection failures, HTTP 5xx, HTTP 429.
///
/// **Not retriable:** timeouts, other 4xx statuses, malformed bodies, and
/// everything that is not an HTTP error.
pub(crate) fn is_retriable(err: &IdeaError) -> bool {
    match err {
        IdeaError::Http(e) => {
            !e.is_timeout()
                && (e.is_connect() || e.status().is_some_and(|s| s.is_server_error()))
        }
        IdeaError::Status { status, .. } => {
            status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
        }
        IdeaError::Deserialize { .. }
        | IdeaError::InvalidUrl { .. }
        | IdeaError::Llm(_)
        | IdeaError::DedupLog(_)
        | IdeaError::Io(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The delay before attempt `n + 1` is `backoff_base_ms × 2ⁿ⁻¹ ± 25 %`,
/// capped at 30 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, IdeaError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, IdeaError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient HTTP error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
