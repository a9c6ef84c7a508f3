//! Text generation provider abstraction and implementations.
//!
//! Defines the [`Generator`] trait and concrete implementations:
//! - **[`DisabledGenerator`]**: always errors; callers fall back to
//!   templated text.
//! - **[`OpenAIGenerator`]**: calls the OpenAI chat-completions API.
//! - **[`OllamaGenerator`]**: calls a local Ollama instance's
//!   `/api/generate` endpoint without streaming.
//!
//! # Provider Selection
//!
//! ```rust,no_run
//! # use sdgp_context::config::GenerationConfig;
//! # use sdgp_context::generation::create_generator;
//! let config = GenerationConfig::default(); // provider = "disabled"
//! let generator = create_generator(&config).unwrap();
//! assert_eq!(generator.name(), "disabled");
//! ```
//!
//! # Retry Strategy
//!
//! Both network providers use exponential backoff for transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GenerationConfig;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// A backend that turns a prompt into text.
///
/// Implement this to plug a custom model into
/// [`ProjectHarness`](crate::harness::ProjectHarness).
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model or provider identifier, for logs and status output.
    fn name(&self) -> &str;

    /// Produce a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build the generator selected by `config.provider`.
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledGenerator)),
        "openai" => Ok(Arc::new(OpenAIGenerator::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaGenerator::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}

// ============ Disabled ============

pub struct DisabledGenerator;

#[async_trait]
impl Generator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        bail!("Generation provider is disabled")
    }
}

// ============ OpenAI ============

/// Generator backed by `POST /v1/chat/completions`.
///
/// Requires the `OPENAI_API_KEY` environment variable.
pub struct OpenAIGenerator {
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl OpenAIGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("generation.model required for OpenAI provider"))?;
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;

        Ok(Self {
            model,
            api_key,
            client: http_client(config)?,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let json = post_with_retry(self.max_retries, "OpenAI", || {
            self.client
                .post(OPENAI_CHAT_URL)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
        })
        .await?;

        parse_openai_response(&json)
    }
}

fn parse_openai_response(json: &Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing choices[0].message.content"))
}

// ============ Ollama ============

/// Generator backed by a local Ollama instance (`POST /api/generate`).
pub struct OllamaGenerator {
    model: String,
    url: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("generation.model required for Ollama provider"))?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        Ok(Self {
            model,
            url: url.trim_end_matches('/').to_string(),
            client: http_client(config)?,
            max_retries: config.max_retries,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });
        let endpoint = format!("{}/api/generate", self.url);

        let json = post_with_retry(self.max_retries, "Ollama", || {
            self.client.post(endpoint.as_str()).json(&body)
        })
        .await
        .map_err(|e| anyhow!("{} (is Ollama running at {}?)", e, self.url))?;

        parse_ollama_response(&json)
    }
}

fn parse_ollama_response(json: &Value) -> Result<String> {
    json.get("response")
        .and_then(|r| r.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid Ollama response: missing response field"))
}

// ============ Shared HTTP plumbing ============

fn http_client(config: &GenerationConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

/// Delay before retry number `attempt` (1-based): 1s, 2s, 4s, ... 32s.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt.saturating_sub(1)).min(5))
}

/// Send the request built by `build` until it succeeds, a non-retryable
/// status comes back, or `max_retries` retries are used up.
async fn post_with_retry<F>(max_retries: u32, label: &str, build: F) -> Result<Value>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff_delay(attempt);
            tracing::debug!(provider = label, attempt, ?delay, "retrying generation request");
            tokio::time::sleep(delay).await;
        }

        match build().send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return Ok(response.json().await?);
                }

                let body_text = response.text().await.unwrap_or_default();
                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(anyhow!("{} API error {}: {}", label, status, body_text));
                    continue;
                }

                bail!("{} API error {}: {}", label, status, body_text);
            }
            Err(e) => {
                last_err = Some(anyhow!("{} connection error: {}", label, e));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("{} generation failed after retries", label)))
}
