use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for tests
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; only malformed values are rejected. The LLM
/// key is optional: without it the optimizer runs its heuristic fallback.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("VIDFORGE_ENV", "development"))?;
    let log_level = or_default("VIDFORGE_LOG_LEVEL", "info");
    let niche = or_default("VIDFORGE_NICHE", "coding");

    let sources_path = PathBuf::from(or_default("VIDFORGE_SOURCES_PATH", "./config/sources.yaml"));
    let dedup_log_path = PathBuf::from(or_default(
        "VIDFORGE_DEDUP_LOG_PATH",
        "./data/used_ideas.jsonl",
    ));
    let output_path = PathBuf::from(or_default("VIDFORGE_OUTPUT_PATH", "./generated_ideas.json"));

    let batch_size = parse_positive_usize("VIDFORGE_BATCH_SIZE", "3")?;
    let optimizer_top_k = parse_positive_usize("VIDFORGE_OPTIMIZER_TOP_K", "10")?;

    let http_timeout_secs = parse_u64("VIDFORGE_HTTP_TIMEOUT_SECS", "10")?;
    let http_max_retries = parse_u32("VIDFORGE_HTTP_MAX_RETRIES", "2")?;
    let http_retry_backoff_ms = parse_u64("VIDFORGE_HTTP_RETRY_BACKOFF_MS", "500")?;
    let user_agent = or_default("VIDFORGE_USER_AGENT", "vidforge/0.1 (trend-ideas)");
    let schedule_cron = or_default("VIDFORGE_SCHEDULE_CRON", "0 0 18 * * *");

    let llm_api_key = lookup("GROQ_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    let llm_model = or_default("GROQ_MODEL", "openai/gpt-oss-120b");
    let llm_base_url = or_default("VIDFORGE_LLM_BASE_URL", "https://api.groq.com/openai/v1");
    let llm_timeout_secs = parse_u64("VIDFORGE_LLM_TIMEOUT_SECS", "30")?;

    Ok(AppConfig {
        env,
        log_level,
        niche,
        sources_path,
        dedup_log_path,
        output_path,
        batch_size,
        optimizer_top_k,
        http_timeout_secs,
        http_max_retries,
        http_retry_backoff_ms,
        user_agent,
        schedule_cron,
        llm_api_key,
        llm_model,
        llm_base_url,
        llm_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VIDFORGE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
