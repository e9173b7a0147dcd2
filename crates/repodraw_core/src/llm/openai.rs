//! Blocking chat-completions client for OpenAI-compatible endpoints.
//!
//! # Responsibility
//! - Issue one bounded-timeout completion request per invocation.
//! - Classify transport, status, timeout and payload failures separately.
//!
//! # Invariants
//! - The request timeout is always explicit and bounded.
//! - No retries; the orchestrator owns retry decisions.

use crate::llm::{ChatMessage, GenerationClient, GenerationError};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default endpoint prefix for the hosted API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default bound for one completion request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const MAX_ERROR_BODY_CHARS: usize = 300;

/// Connection settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Endpoint prefix, without the `/chat/completions` suffix.
    pub api_base: String,
    /// Bearer token for the remote service.
    pub api_key: String,
    /// Hard bound for one request, connect time included.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Creates a config with default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads config from `REPODRAW_OPENAI_API_KEY`, optionally overridden by
    /// `REPODRAW_OPENAI_API_BASE` and `REPODRAW_OPENAI_TIMEOUT_SECS`.
    ///
    /// This is the only environment-reading entry point in core; everything
    /// else receives its collaborators through constructors.
    pub fn from_env() -> Result<Self, String> {
        let api_key = std::env::var("REPODRAW_OPENAI_API_KEY")
            .map_err(|_| "REPODRAW_OPENAI_API_KEY is not set".to_string())?;
        let mut config = Self::new(api_key);

        if let Ok(api_base) = std::env::var("REPODRAW_OPENAI_API_BASE") {
            config.api_base = api_base;
        }
        if let Ok(raw_secs) = std::env::var("REPODRAW_OPENAI_TIMEOUT_SECS") {
            let secs: u64 = raw_secs
                .trim()
                .parse()
                .map_err(|_| format!("invalid REPODRAW_OPENAI_TIMEOUT_SECS `{raw_secs}`"))?;
            if secs == 0 {
                return Err("REPODRAW_OPENAI_TIMEOUT_SECS must be positive".to_string());
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Blocking HTTP implementation of [`GenerationClient`].
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiClient {
    /// Builds the HTTP client with the configured request bound.
    pub fn new(config: OpenAiConfig) -> Result<Self, GenerationError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| {
                GenerationError::Transport(format!("failed to build http client: {err}"))
            })?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            timeout: config.timeout,
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl GenerationClient for OpenAiClient {
    fn invoke(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<String, GenerationError> {
        let started_at = Instant::now();
        info!("event=llm_invoke module=llm status=start model={model_id}");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: model_id,
                messages,
            })
            .send()
            .map_err(|err| {
                let classified = classify_send_error(err, self.timeout);
                error!(
                    "event=llm_invoke module=llm status=error model={model_id} duration_ms={} error={classified}",
                    started_at.elapsed().as_millis()
                );
                classified
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = truncate_body(&response.text().unwrap_or_default());
            error!(
                "event=llm_invoke module=llm status=error model={model_id} duration_ms={} http_status={}",
                started_at.elapsed().as_millis(),
                status.as_u16()
            );
            return Err(GenerationError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().map_err(|err| {
            GenerationError::MalformedResponse(format!("invalid completion payload: {err}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(GenerationError::MalformedResponse(
                "completion contained no text".to_string(),
            ));
        }

        info!(
            "event=llm_invoke module=llm status=ok model={model_id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(content)
    }
}

fn classify_send_error(err: reqwest::Error, timeout: Duration) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout(format!("no completion within {}s", timeout.as_secs()))
    } else {
        GenerationError::Transport(err.to_string())
    }
}

fn truncate_body(body: &str) -> String {
    let mut truncated = body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>();
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        truncated.push_str("...");
    }
    truncated
}
