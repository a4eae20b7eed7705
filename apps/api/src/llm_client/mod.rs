/// LLM Client: the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may call a text-generation API directly.
/// Planner and chat both go through a `ProviderChain` built here at startup.
///
/// Providers are tried in priority order; the first success wins. Every call
/// is bounded by the chain's per-call timeout.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use thiserror::Error;
use tracing::{info, warn};

pub mod gemini;
pub mod groq;
pub mod prompts;

pub use gemini::GeminiClient;
pub use groq::GroqClient;

const MAX_RETRIES: u32 = 3;
/// Sampling temperature shared by all providers.
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_OUTPUT_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Response blocked by provider safety filters")]
    SafetyBlocked,

    #[error("Provider '{provider}' timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },

    #[error("No text-generation providers are configured")]
    NoProviders,
}

/// A text-generation backend. Implementations own their HTTP client and key.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

/// Text returned by the chain together with the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub provider: String,
    pub text: String,
}

/// Ordered list of providers with a per-call deadline.
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// A chain with no providers. Every `generate` reports `NoProviders`.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Duration::from_secs(60))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Tries each provider in order and returns the first success, or the last
    /// error when all of them fail.
    pub async fn generate(&self, prompt: &str, system: &str) -> Result<Generated, LlmError> {
        let mut last_error = LlmError::NoProviders;

        for provider in &self.providers {
            let name = provider.name().to_string();
            let result = tokio::time::timeout(self.timeout, provider.generate(prompt, system))
                .await
                .unwrap_or_else(|_| {
                    Err(LlmError::Timeout {
                        provider: name.clone(),
                        secs: self.timeout.as_secs(),
                    })
                });

            match result {
                Ok(text) if !text.trim().is_empty() => {
                    info!("Provider '{name}' generated {} chars", text.len());
                    return Ok(Generated {
                        provider: name,
                        text,
                    });
                }
                Ok(_) => {
                    warn!("Provider '{name}' returned empty content");
                    last_error = LlmError::EmptyContent;
                }
                Err(e) => {
                    warn!("Provider '{name}' failed: {e}");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

/// Builds a shared HTTP client for provider calls.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .expect("Failed to build HTTP client")
}

/// Sends a request, retrying on 429 (rate limit) and 5xx errors with
/// exponential backoff (1s, 2s). `build` is called once per attempt.
pub(crate) async fn send_with_retry<F>(provider: &str, build: F) -> Result<Response, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "{provider} call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("{provider} API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        return Ok(response);
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: MAX_RETRIES,
    }))
}

/// Pulls `error.message` out of a provider error body; both Groq and Gemini
/// nest it the same way. Falls back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
