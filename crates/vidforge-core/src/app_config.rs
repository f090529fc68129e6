use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Niche/category tag stamped on every emitted idea record.
    pub niche: String,
    pub sources_path: PathBuf,
    pub dedup_log_path: PathBuf,
    pub output_path: PathBuf,
    pub batch_size: usize,
    pub optimizer_top_k: usize,
    pub http_timeout_secs: u64,
    pub http_max_retries: u32,
    pub http_retry_backoff_ms: u64,
    pub user_agent: String,
    pub schedule_cron: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_base_url: String,
    pub llm_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("niche", &self.niche)
            .field("sources_path", &self.sources_path)
            .field("dedup_log_path", &self.dedup_log_path)
            .field("output_path", &self.output_path)
            .field("batch_size", &self.batch_size)
            .field("optimizer_top_k", &self.optimizer_top_k)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_max_retries", &self.http_max_retries)
            .field("http_retry_backoff_ms", &self.http_retry_backoff_ms)
            .field("user_agent", &self.user_agent)
            .field("schedule_cron", &self.schedule_cron)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .finish()
    }
}
