use thiserror::Error;

/// Errors raised inside the idea pipeline.
///
/// None of these escape a pipeline run: fetchers turn them into
/// `FetchOutcome::Unavailable`, the optimizer into its heuristic fallback.
#[derive(Debug, Error)]
pub enum IdeaError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{context} returned status {status}")]
    Status {
        context: String,
        status: reqwest::StatusCode,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The LLM answered, but not with something we can use.
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("dedup log error: {0}")]
    DedupLog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
