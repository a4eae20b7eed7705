// Prompts for the marketing chat assistant.

use crate::llm_client::prompts::{compose_system, STRATEGIST_PERSONA};

pub const ASSISTANT_SYSTEM: &str = "\
You are the campaign planner's built-in marketing assistant. Your expertise covers:
- Social media strategy and content planning
- Platform-specific best practices (Instagram, LinkedIn, Twitter/X, Facebook, TikTok, YouTube)
- Captions, copywriting and hashtag research
- Audience engagement, growth and analytics
- Paid campaigns, influencer collaborations and brand building

Response style:
- Be enthusiastic and creative while remaining professional
- Give specific, actionable advice; offer options and variations
- Use bulleted lists for ideas and action items
- Consider current trends, seasonal relevance and ROI

Current date: {current_date}";

pub const CONTEXT_HINTS_HEADER: &str = "Specific context for this query:";

/// Wraps the user's question with optional business context.
pub const CONTEXTUAL_QUERY: &str = "Context about my business: {context}\n\nQuestion: {query}";

pub fn assistant_system(current_date: &str, hints: &[&str]) -> String {
    let base = ASSISTANT_SYSTEM.replace("{current_date}", current_date);
    let hints = if hints.is_empty() {
        String::new()
    } else {
        let lines = hints
            .iter()
            .map(|h| format!("- {h}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{CONTEXT_HINTS_HEADER}\n{lines}")
    };
    compose_system(&[STRATEGIST_PERSONA, &base, &hints])
}

pub fn user_query(query: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => CONTEXTUAL_QUERY
            .replace("{context}", context)
            .replace("{query}", query),
        None => query.to_string(),
    }
}

/// Canned answer used when every provider fails.
pub const OFFLINE_RESPONSE: &str = "I'm temporarily experiencing technical difficulties, but here are some quick social media tips while I get back online:

Content ideas:
- Share behind-the-scenes content
- Post user-generated content
- Create educational carousel posts
- Share industry insights and tips

Engagement boosters:
- Ask questions in your captions
- Use trending hashtags (research first!)
- Post when your audience is most active
- Respond to comments quickly

Platform tips:
- Instagram: focus on visual storytelling
- LinkedIn: share professional insights
- TikTok: jump on trending sounds and challenges
- Twitter/X: engage in real-time conversations

Please try your question again in a moment.";
