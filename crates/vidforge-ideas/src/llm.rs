//! Minimal client for OpenAI-compatible chat completion APIs (Groq by default).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use vidforge_core::AppConfig;

use crate::error::IdeaError;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat completions client.
///
/// Use [`ChatClient::new`] for Groq or [`ChatClient::with_base_url`] to point
/// at another compatible provider or a mock server in tests.
pub struct ChatClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// # Errors
    ///
    /// Returns [`IdeaError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, IdeaError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`IdeaError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, IdeaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            max_retries: 0,
            retry_backoff_ms: 0,
        })
    }

    /// Client from application config, or `None` when no API key is set.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaError::Http`] if the `reqwest::Client` cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Option<Self>, IdeaError> {
        let Some(api_key) = config.llm_api_key.as_deref() else {
            return Ok(None);
        };
        let client = Self::with_base_url(
            api_key,
            &config.llm_model,
            config.llm_timeout_secs,
            &config.llm_base_url,
        )?
        .with_retries(config.http_max_retries, config.http_retry_backoff_ms);
        Ok(Some(client))
    }

    /// Retry connection failures, 5xx and 429 up to `max_retries` times.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, retry_backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user message and return the assistant's reply text.
    ///
    /// # Errors
    ///
    /// - [`IdeaError::Http`] on network failure or timeout.
    /// - [`IdeaError::Status`] on a non-2xx status (bad key, quota, outage).
    /// - [`IdeaError::Deserialize`] if the body is not a chat completion.
    /// - [`IdeaError::Llm`] if the completion has no content.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, IdeaError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens,
        };

        tracing::debug!(model = %self.model, max_tokens, "LLM chat request");

        let client = &self.client;
        let endpoint = self.endpoint.as_str();
        let api_key = self.api_key.as_str();
        let request = &request;
        let body = retry_with_backoff(self.max_retries, self.retry_backoff_ms, move || async move {
            let response = client
                .post(endpoint)
                .bearer_auth(api_key)
                .json(request)
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(IdeaError::Status {
                    context: "chat completion".to_owned(),
                    status,
                });
            }
            Ok(response.text().await?)
        })
        .await?;

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| IdeaError::Deserialize {
                context: "chat completion".to_owned(),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| IdeaError::Llm("completion has no content".to_owned()))
    }
}

/// Strip a surrounding markdown code fence, if any.
pub(crate) fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

/// The outermost `{ ... }` span of `s`, for replies with chatter around the JSON.
pub(crate) fn extract_json_object(s: &str) -> Option<&str> {
    let body = strip_code_fences(s);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (end > start).then(|| &body[start..=end])
}
