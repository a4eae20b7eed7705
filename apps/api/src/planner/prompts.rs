// Prompts for campaign content planning.

use crate::llm_client::prompts::{compose_system, PLAIN_TEXT_INSTRUCTION, STRATEGIST_PERSONA};

const PLANNER_RULES: &str = "\
    You write social media content calendars. Every post you produce MUST fill all five \
    numbered fields. Keep field headers exactly as shown so the plan can be imported.";

/// User prompt for a content calendar. `{schedule}` is a numbered list of the
/// exact slots; the model is asked to reuse them verbatim.
pub const CONTENT_PLAN_PROMPT: &str = r#"Create a comprehensive content calendar for the '{campaign_name}' campaign focused on '{theme}'.

REQUIREMENTS:
- Generate exactly {count} unique posts
- Each post must have ALL 5 required fields filled out completely
- Provide specific, actionable content ideas (not generic descriptions)
- Vary the content types: Image Post, Carousel (2-5 slides), Video/Reel, Story
- Use these posting slots, in order, one per post:
{schedule}

For each post, you MUST provide:

Post [NUMBER]
1. What to Post: [Specific topic related to {theme}]
2. Type of Post: [Image Post, Carousel, Video/Reel, or Story]
3. Posting Schedule: [The slot assigned to this post]
4. Description: [2-3 sentences on the visual content, key points and messaging]
5. Call-to-Action: [Specific, compelling CTA that drives engagement]

EXAMPLE FORMAT:
Post 1
1. What to Post: 5 simple eco-friendly swaps for daily routines
2. Type of Post: Carousel
3. Posting Schedule: May 24 at 10:00 AM
4. Description: Before/after comparisons of wasteful vs. eco-friendly alternatives with bright, clean graphics and one statistic per slide.
5. Call-to-Action: Which eco-swap will you try first? Tag a friend to join the challenge!

Now create {count} posts following this exact format for the theme "{theme}":"#;

pub fn planner_system() -> String {
    compose_system(&[STRATEGIST_PERSONA, PLANNER_RULES, PLAIN_TEXT_INSTRUCTION])
}

pub fn build_plan_prompt(campaign_name: &str, theme: &str, count: usize, schedule: &[String]) -> String {
    let slots = schedule
        .iter()
        .enumerate()
        .map(|(i, slot)| format!("  Post {}: {slot}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    CONTENT_PLAN_PROMPT
        .replace("{campaign_name}", campaign_name)
        .replace("{theme}", theme)
        .replace("{count}", &count.to_string())
        .replace("{schedule}", &slots)
}
