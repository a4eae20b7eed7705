//! Google Gemini `generateContent`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{http_client, send_with_retry, LlmError, TextGenerator, MAX_OUTPUT_TOKENS, TEMPERATURE};

pub const GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenates the text parts of the first candidate. A candidate stopped
    /// by the safety filter is an error even if it carries partial text.
    fn into_text(self) -> Result<String, LlmError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyContent)?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(LlmError::SafetyBlocked);
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http_client(),
            api_key,
        }
    }

    fn url() -> String {
        format!("{GEMINI_API_BASE}/{GEMINI_MODEL}:generateContent")
    }
}

fn build_request<'a>(prompt: &'a str, system: &'a str) -> GenerateRequest<'a> {
    GenerateRequest {
        system_instruction: Content {
            parts: vec![Part { text: system }],
        },
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
        safety_settings: SAFETY_CATEGORIES
            .into_iter()
            .map(|category| SafetySetting {
                category,
                threshold: SAFETY_THRESHOLD,
            })
            .collect(),
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let body = build_request(prompt, system);
        let url = Self::url();

        let response = send_with_retry("Gemini", || {
            self.client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
        })
        .await?;

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String, LlmError> {
        serde_json::from_str::<GenerateResponse>(json)
            .unwrap()
            .into_text()
    }

    #[test]
    fn test_text_parts_are_joined() {
        let text = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "Post 1\n"}, {"text": "Title: A"}]},
                "finishReason": "STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(text, "Post 1\nTitle: A");
    }

    #[test]
    fn test_safety_finish_reason_is_an_error() {
        let err = parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap_err();
        assert!(matches!(err, LlmError::SafetyBlocked));
    }

    #[test]
    fn test_no_candidates_is_empty_content() {
        assert!(matches!(parse("{}"), Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_request_carries_safety_settings() {
        let json = serde_json::to_value(build_request("p", "s")).unwrap();
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(json["safetySettings"][0]["threshold"], "BLOCK_MEDIUM_AND_ABOVE");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "s");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn test_url_names_model() {
        assert!(GeminiClient::url().ends_with("gemini-1.5-flash-latest:generateContent"));
    }
}
