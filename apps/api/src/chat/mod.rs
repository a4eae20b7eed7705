//! Marketing chat assistant on top of the shared provider chain.
//!
//! The assistant never fails: when every provider is down it answers with a
//! canned set of tips and flags the reply as degraded.

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use crate::llm_client::ProviderChain;

pub mod handlers;
pub mod prompts;

pub const MAX_QUERY_CHARS: usize = 2000;
pub const MAX_SUGGESTIONS: usize = 5;
const MAX_SUGGESTION_CHARS: usize = 200;
const BULLETS: [char; 4] = ['•', '◦', '-', '*'];

/// Keyword groups and the hint each one adds to the system prompt.
const KEYWORD_HINTS: &[(&[&str], &str)] = &[
    (
        &["instagram", "ig", "reel", "story"],
        "Focus on Instagram-specific strategies and current features.",
    ),
    (
        &["linkedin", "professional", "b2b"],
        "Emphasize professional networking and B2B strategies.",
    ),
    (
        &["tiktok", "viral", "trending"],
        "Include trending formats and viral content strategies.",
    ),
    (
        &["campaign", "ads", "advertising"],
        "Focus on paid advertising strategies and campaign optimization.",
    ),
    (
        &["content calendar", "planning", "schedule"],
        "Provide structured planning and scheduling advice.",
    ),
    (
        &["hashtag", "tags", "#"],
        "Include specific hashtag strategies and trending tags.",
    ),
];

/// Hints derived from query keywords plus the season of `today`.
pub fn context_hints(query: &str, today: NaiveDate) -> Vec<&'static str> {
    let query = query.to_lowercase();
    let words: Vec<&str> = query
        .split(|c: char| !c.is_alphanumeric() && c != '#')
        .filter(|w| !w.is_empty())
        .collect();

    let mut hints: Vec<&'static str> = KEYWORD_HINTS
        .iter()
        .filter(|(keywords, _)| {
            keywords.iter().any(|k| {
                if k.contains(' ') || *k == "#" {
                    query.contains(k)
                } else {
                    words.iter().any(|w| {
                        let w = w.trim_start_matches('#');
                        w == *k || w.strip_suffix('s') == Some(*k)
                    })
                }
            })
        })
        .map(|(_, hint)| *hint)
        .collect();

    match today.month() {
        11 | 12 | 1 => hints.push("Consider holiday and year-end marketing opportunities."),
        6..=8 => hints.push("Consider summer trends and vacation-related content."),
        _ => {}
    }

    hints
}

/// Bullet lines from a reply, cleaned, at most `MAX_SUGGESTIONS`.
pub fn extract_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with(BULLETS) && line.chars().count() > 3)
        .map(|line| line.trim_start_matches(BULLETS).trim().to_string())
        .filter(|s| !s.is_empty() && s.chars().count() < MAX_SUGGESTION_CHARS)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Query text for a quick-suggestion category.
pub fn quick_suggestion_query(category: &str, niche: Option<&str>, platform: Option<&str>) -> String {
    let platform = platform.unwrap_or("social media");
    match category {
        "content_ideas" => format!(
            "Generate 5 engaging content ideas for {} on {platform}",
            niche.unwrap_or("a business")
        ),
        "captions" => format!(
            "Write 3 engaging captions for {} posts on {platform}",
            niche.unwrap_or("a business")
        ),
        "hashtags" => format!(
            "Suggest 15 relevant hashtags for {} on {platform}",
            niche.unwrap_or("a business")
        ),
        "posting_times" => format!(
            "What are the best posting times for {platform} in {}?",
            niche.unwrap_or("general business")
        ),
        "engagement_tips" => format!(
            "Give me 5 tips to increase engagement on {platform} for {}",
            niche.unwrap_or("my business")
        ),
        "trending_topics" => format!(
            "What are some trending topics and content formats for {platform} that {} can use?",
            niche.unwrap_or("businesses")
        ),
        "campaign_ideas" => format!(
            "Suggest 3 creative marketing campaign ideas for {} on {platform}",
            niche.unwrap_or("a business")
        ),
        other => format!(
            "Give me social media advice for {other} related to {}",
            niche.unwrap_or("my business")
        ),
    }
}

#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub text: String,
    pub provider: Option<String>,
    /// True when the canned offline answer was used.
    pub degraded: bool,
}

#[derive(Clone)]
pub struct ChatAssistant {
    providers: ProviderChain,
}

impl ChatAssistant {
    pub fn new(providers: ProviderChain) -> Self {
        Self { providers }
    }

    pub async fn respond(&self, query: &str, context: Option<&str>, today: NaiveDate) -> AssistantReply {
        let hints = context_hints(query, today);
        let system = prompts::assistant_system(&today.format("%B %d, %Y").to_string(), &hints);
        let prompt = prompts::user_query(query, context);

        match self.providers.generate(&prompt, &system).await {
            Ok(generated) => {
                info!("Chat reply generated by '{}'", generated.provider);
                AssistantReply {
                    text: generated.text.trim().to_string(),
                    provider: Some(generated.provider),
                    degraded: false,
                }
            }
            Err(e) => {
                warn!("All chat providers failed: {e}");
                AssistantReply {
                    text: prompts::OFFLINE_RESPONSE.to_string(),
                    provider: None,
                    degraded: true,
                }
            }
        }
    }
}
