use std::time::Instant;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::MaybeAuthUser;
use crate::chat::{extract_suggestions, quick_suggestion_query, ChatAssistant, MAX_QUERY_CHARS};
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub suggestions: Option<Vec<String>>,
    pub conversation_id: String,
    pub timestamp: String,
    pub response_time: f64,
}

#[derive(Debug, Deserialize)]
pub struct QuickSuggestionRequest {
    pub category: String,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuickSuggestionResponse {
    pub category: String,
    pub niche: Option<String>,
    pub platform: Option<String>,
    pub suggestions: String,
    pub timestamp: String,
}

fn validate_query(query: &str) -> Result<&str, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::Validation(
            "Query cannot be empty. Ask me something about social media marketing!".to_string(),
        ));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::Validation(format!(
            "Query is too long (max {MAX_QUERY_CHARS} characters)"
        )));
    }
    Ok(query)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /api/chatbot/
pub async fn handle_chat(
    State(assistant): State<ChatAssistant>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let started = Instant::now();
    let query = validate_query(&req.query)?;
    let caller = user_id.as_deref().unwrap_or("anonymous");
    info!("Chat request from {caller} ({} chars)", query.chars().count());

    let now = Utc::now();
    let reply = assistant
        .respond(query, req.context.as_deref(), now.date_naive())
        .await;

    let suggestions = extract_suggestions(&reply.text);
    let conversation_id = non_blank(req.conversation_id)
        .unwrap_or_else(|| format!("conv_{}", now.timestamp()));
    let response_time = started.elapsed().as_secs_f64();

    info!(
        "Chat reply for {caller} in {response_time:.2}s (degraded: {})",
        reply.degraded
    );

    Ok(Json(ChatResponse {
        response: reply.text,
        suggestions: (!suggestions.is_empty()).then_some(suggestions),
        conversation_id,
        timestamp: Utc::now().to_rfc3339(),
        response_time,
    }))
}

/// POST /api/chatbot/quick-suggestions/
pub async fn handle_quick_suggestions(
    State(assistant): State<ChatAssistant>,
    MaybeAuthUser(_user_id): MaybeAuthUser,
    Json(req): Json<QuickSuggestionRequest>,
) -> Result<Json<QuickSuggestionResponse>, AppError> {
    let category = req.category.trim().to_lowercase();
    if category.is_empty() {
        return Err(AppError::Validation("category cannot be empty".to_string()));
    }
    let niche = non_blank(req.niche);
    let platform = non_blank(req.platform);
    info!(
        "Quick suggestions requested: {category} for {}",
        niche.as_deref().unwrap_or("general")
    );

    let query = quick_suggestion_query(&category, niche.as_deref(), platform.as_deref());
    let reply = assistant.respond(&query, None, Utc::now().date_naive()).await;

    Ok(Json(QuickSuggestionResponse {
        category,
        niche,
        platform,
        suggestions: reply.text,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /api/chatbot/capabilities/
pub async fn handle_capabilities() -> Json<Value> {
    Json(json!({
        "name": "Campaign Planner Assistant",
        "version": env!("CARGO_PKG_VERSION"),
        "capabilities": [
            "Social media strategy planning",
            "Content idea generation",
            "Caption and copy writing",
            "Hashtag research and suggestions",
            "Platform-specific advice",
            "Trend analysis and recommendations",
            "Engagement optimization tips",
            "Campaign planning and execution",
            "Brand building strategies"
        ],
        "supported_platforms": [
            "Instagram", "LinkedIn", "Twitter/X", "Facebook", "TikTok", "YouTube", "Pinterest"
        ],
        "quick_suggestion_categories": [
            "content_ideas", "captions", "hashtags", "posting_times",
            "engagement_tips", "trending_topics", "campaign_ideas"
        ],
        "limits": {
            "max_query_chars": MAX_QUERY_CHARS,
            "max_suggestions": crate::chat::MAX_SUGGESTIONS
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::fakes::FakeGenerator;
    use crate::llm_client::ProviderChain;
    use std::time::Duration;

    fn assistant(reply: &str) -> ChatAssistant {
        ChatAssistant::new(ProviderChain::new(
            vec![FakeGenerator::ok("gemini", reply)],
            Duration::from_secs(30),
        ))
    }

    fn chat_request(query: &str, conversation_id: Option<&str>) -> ChatRequest {
        ChatRequest {
            query: query.to_string(),
            context: None,
            conversation_id: conversation_id.map(str::to_string),
        }
    }

    #[test]
    fn test_query_validation() {
        assert!(validate_query("   ").is_err());
        assert!(validate_query(&"a".repeat(MAX_QUERY_CHARS + 1)).is_err());
        assert_eq!(validate_query("  hi  ").unwrap(), "hi");
        assert!(validate_query(&"é".repeat(MAX_QUERY_CHARS)).is_ok());
    }

    #[tokio::test]
    async fn test_chat_returns_suggestions_and_generated_id() {
        let Json(response) = handle_chat(
            State(assistant("Try these:\n• Post a poll\n• Share a reel")),
            MaybeAuthUser(None),
            Json(chat_request("ideas for my bakery?", None)),
        )
        .await
        .unwrap();

        assert_eq!(
            response.suggestions,
            Some(vec!["Post a poll".to_string(), "Share a reel".to_string()])
        );
        assert!(response.conversation_id.starts_with("conv_"));
        assert!(response.response_time >= 0.0);
    }

    #[tokio::test]
    async fn test_chat_keeps_conversation_id_and_omits_empty_suggestions() {
        let Json(response) = handle_chat(
            State(assistant("Post on Tuesdays.")),
            MaybeAuthUser(Some("uid42".to_string())),
            Json(chat_request("when?", Some("conv_123"))),
        )
        .await
        .unwrap();

        assert_eq!(response.conversation_id, "conv_123");
        assert!(response.suggestions.is_none());
        assert_eq!(response.response, "Post on Tuesdays.");
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_query() {
        let result = handle_chat(
            State(assistant("unused")),
            MaybeAuthUser(None),
            Json(chat_request(" \n ", None)),
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_quick_suggestions_echo_inputs() {
        let Json(response) = handle_quick_suggestions(
            State(assistant("#bakery #bread")),
            MaybeAuthUser(None),
            Json(QuickSuggestionRequest {
                category: "Hashtags".to_string(),
                niche: Some("bakery".to_string()),
                platform: Some(" ".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.category, "hashtags");
        assert_eq!(response.niche.as_deref(), Some("bakery"));
        assert!(response.platform.is_none());
        assert_eq!(response.suggestions, "#bakery #bread");
    }

    #[tokio::test]
    async fn test_capabilities_lists_categories() {
        let Json(body) = handle_capabilities().await;
        assert_eq!(body["quick_suggestion_categories"].as_array().unwrap().len(), 7);
        assert_eq!(body["limits"]["max_query_chars"], 2000);
    }
}
