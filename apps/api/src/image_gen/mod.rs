//! Text-to-image through the Hugging Face inference API, with model fallback.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;

pub mod handlers;

const HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";

/// Fallback order when no model is requested.
pub const DEFAULT_MODELS: [&str; 2] = [
    "stabilityai/stable-diffusion-xl-base-1.0",
    "runwayml/stable-diffusion-v1-5",
];

/// Upper bound on how long a cold model is waited for.
pub const MAX_LOADING_WAIT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("Image generation is not configured")]
    NotConfigured,

    #[error("All image models failed: {0}")]
    AllModelsFailed(String),
}

impl From<ImageGenError> for AppError {
    fn from(e: ImageGenError) -> Self {
        match e {
            ImageGenError::NotConfigured => AppError::ServiceUnavailable(e.to_string()),
            ImageGenError::AllModelsFailed(msg) => AppError::BadGateway(msg),
        }
    }
}

/// Requested model first, then the defaults, without duplicates.
pub fn model_order(requested: Option<&str>) -> Vec<String> {
    let mut models: Vec<String> = requested
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .into_iter()
        .collect();
    for model in DEFAULT_MODELS {
        if !models.iter().any(|m| m == model) {
            models.push(model.to_string());
        }
    }
    models
}

#[derive(Debug, Deserialize)]
struct InferenceError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    estimated_time: Option<f64>,
}

/// What a non-success response means for the current model.
#[derive(Debug, PartialEq)]
enum Failure {
    /// Model is cold; wait this long and retry once.
    Loading { wait: Duration, message: String },
    Failed(String),
}

fn classify_failure(status: StatusCode, body: &[u8]) -> Failure {
    match serde_json::from_slice::<InferenceError>(body) {
        Ok(InferenceError {
            estimated_time: Some(secs),
            error,
        }) => Failure::Loading {
            wait: Duration::from_secs_f64(secs.max(0.0)).min(MAX_LOADING_WAIT),
            message: error.unwrap_or_else(|| "Model is still loading".to_string()),
        },
        Ok(InferenceError {
            error: Some(message),
            ..
        }) => Failure::Failed(message),
        _ => Failure::Failed(format!("API returned status code {}", status.as_u16())),
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub model: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct HfImageClient {
    client: Client,
    api_key: String,
}

impl HfImageClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn call(&self, model: &str, prompt: &str) -> Result<Bytes, Failure> {
        let response = self
            .client
            .post(format!("{HF_INFERENCE_URL}/{model}"))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "inputs": prompt }))
            .send()
            .await
            .map_err(|e| Failure::Failed(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Failure::Failed(e.to_string()))?;

        if status.is_success() {
            if body.is_empty() {
                return Err(Failure::Failed("Received empty image data".to_string()));
            }
            return Ok(body);
        }
        Err(classify_failure(status, &body))
    }

    /// Tries each model in order. A loading model is waited on and retried once.
    pub async fn generate(
        &self,
        prompt: &str,
        requested_model: Option<&str>,
    ) -> Result<GeneratedImage, ImageGenError> {
        let mut last_error = String::from("All models failed to generate image");

        for model in model_order(requested_model) {
            let outcome = match self.call(&model, prompt).await {
                Err(Failure::Loading { wait, message }) => {
                    info!("Model {model} is loading, retrying in {:.1}s", wait.as_secs_f64());
                    tokio::time::sleep(wait).await;
                    self.call(&model, prompt).await.map_err(|retry| match retry {
                        Failure::Loading { .. } => Failure::Failed(message),
                        other => other,
                    })
                }
                other => other,
            };

            match outcome {
                Ok(bytes) => {
                    info!("Generated image with {model} ({} bytes)", bytes.len());
                    return Ok(GeneratedImage { model, bytes });
                }
                Err(Failure::Failed(message)) | Err(Failure::Loading { message, .. }) => {
                    warn!("Image model {model} failed: {message}");
                    last_error = message;
                }
            }
        }

        Err(ImageGenError::AllModelsFailed(last_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_order() {
        assert_eq!(model_order(None), DEFAULT_MODELS.map(String::from).to_vec());
        assert_eq!(model_order(Some("  ")), DEFAULT_MODELS.map(String::from).to_vec());
    }

    #[test]
    fn test_requested_model_goes_first_without_duplicates() {
        assert_eq!(
            model_order(Some("runwayml/stable-diffusion-v1-5")),
            vec![
                "runwayml/stable-diffusion-v1-5".to_string(),
                "stabilityai/stable-diffusion-xl-base-1.0".to_string(),
            ]
        );
        assert_eq!(model_order(Some("my/model")).len(), 3);
        assert_eq!(model_order(Some("my/model"))[0], "my/model");
    }

    #[test]
    fn test_loading_wait_is_capped() {
        let failure = classify_failure(
            StatusCode::SERVICE_UNAVAILABLE,
            br#"{"error": "Model is currently loading", "estimated_time": 86.5}"#,
        );
        assert_eq!(
            failure,
            Failure::Loading {
                wait: MAX_LOADING_WAIT,
                message: "Model is currently loading".to_string()
            }
        );
    }

    #[test]
    fn test_short_loading_wait_is_kept() {
        match classify_failure(StatusCode::SERVICE_UNAVAILABLE, br#"{"estimated_time": 4.0}"#) {
            Failure::Loading { wait, message } => {
                assert_eq!(wait, Duration::from_secs(4));
                assert_eq!(message, "Model is still loading");
            }
            other => panic!("expected loading, got {other:?}"),
        }
    }

    #[test]
    fn test_error_message_and_unknown_bodies() {
        assert_eq!(
            classify_failure(StatusCode::BAD_REQUEST, br#"{"error": "Authorization header is invalid"}"#),
            Failure::Failed("Authorization header is invalid".to_string())
        );
        assert_eq!(
            classify_failure(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>"),
            Failure::Failed("API returned status code 502".to_string())
        );
    }

    #[test]
    fn test_error_mapping() {
        use axum::response::IntoResponse;
        let status = AppError::from(ImageGenError::NotConfigured)
            .into_response()
            .status();
        assert_eq!(status, axum::http::StatusCode::SERVICE_UNAVAILABLE);
        let status = AppError::from(ImageGenError::AllModelsFailed("x".into()))
            .into_response()
            .status();
        assert_eq!(status, axum::http::StatusCode::BAD_GATEWAY);
    }
}
