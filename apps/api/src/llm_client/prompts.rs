// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Persona shared by the campaign planner and the chat assistant.
pub const STRATEGIST_PERSONA: &str = "You are a seasoned social media strategist with 10+ years of \
    experience creating engaging content across Instagram, LinkedIn, Twitter/X, Facebook and TikTok. \
    You give specific, actionable advice and never pad answers with generic filler.";

/// Instruction appended to prompts whose output is parsed line by line.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Respond in plain text only. Do NOT wrap the answer in JSON or markdown code fences. \
    Do NOT add an introduction or a closing summary.";

/// Joins a persona with extra system instructions, one paragraph each.
pub fn compose_system(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
