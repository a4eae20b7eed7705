//! Groq chat completions (OpenAI-compatible wire format).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{http_client, send_with_retry, LlmError, TextGenerator, MAX_OUTPUT_TOKENS, TEMPERATURE};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const GROQ_MODEL: &str = "llama3-70b-8192";
/// Groq keys always carry this prefix; anything else is treated as unset.
pub const GROQ_KEY_PREFIX: &str = "gsk_";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
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
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
}

impl GroqClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http_client(),
            api_key,
        }
    }

    /// Returns a client only for a key with the expected prefix.
    pub fn from_key(api_key: Option<&str>) -> Option<Self> {
        api_key
            .filter(|k| k.starts_with(GROQ_KEY_PREFIX))
            .map(|k| Self::new(k.to_string()))
    }
}

#[async_trait]
impl TextGenerator for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: GROQ_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
            stream: false,
        };

        let response = send_with_retry("Groq", || {
            self.client
                .post(GROQ_API_URL)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        let parsed: ChatResponse = response.json().await?;
        parsed.into_text()
    }
}
