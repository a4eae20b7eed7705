//! Fallback Content Synthesizer: deterministic posts for when generation
//! is unavailable or unusable.

use tracing::info;

use crate::planner::post::{PostRecord, CONTENT_TYPES};
use crate::planner::schedule::day_slot;

/// Topic titles keyed by theme keyword. Order is the match priority.
const KEYWORD_BANK: &[(&str, [&str; 5])] = &[
    (
        "sustainability",
        [
            "5 Simple Eco-Friendly Swaps for Your Daily Routine",
            "The Hidden Environmental Cost of Fast Fashion",
            "DIY Natural Cleaning Products That Actually Work",
            "How to Reduce Your Carbon Footprint in 30 Days",
            "Sustainable Travel Tips for the Eco-Conscious Explorer",
        ],
    ),
    (
        "technology",
        [
            "AI Tools That Will Transform Your Workflow",
            "The Future of Remote Work Technology",
            "Cybersecurity Tips Every Professional Should Know",
            "Emerging Tech Trends to Watch This Year",
            "How to Automate Your Daily Tasks",
        ],
    ),
    (
        "marketing",
        [
            "Content Marketing Strategies That Drive Results",
            "Social Media Trends Dominating 2025",
            "Email Marketing Mistakes to Avoid",
            "Building Brand Authority Through Thought Leadership",
            "ROI-Driven Digital Marketing Tactics",
        ],
    ),
    (
        "food",
        [
            "Quick Healthy Meals for Busy Weekdays",
            "The Science Behind Food Cravings",
            "Local Ingredients That Boost Nutrition",
            "Meal Prep Strategies for Success",
            "Sustainable Eating on a Budget",
        ],
    ),
    (
        "awareness",
        [
            "Breaking the Stigma: Understanding Mental Health",
            "The Science Behind Addiction and Recovery",
            "Supporting Loved Ones Through Difficult Times",
            "Evidence-Based Treatment Approaches",
            "Building Resilience and Recovery Communities",
        ],
    ),
];

const CALLS_TO_ACTION: [&str; 5] = [
    "Save this post and try it out! Let us know your results in the comments 💭",
    "Share your experience with this in the comments below 👇",
    "Tag someone who needs to see this! 🏷️",
    "Double-tap if you agree and follow for more tips! ❤️",
    "What's your take on this? Join the conversation in the comments 💬",
];

/// First bank entry whose keyword occurs in the theme, case-insensitively.
fn bank_titles(theme: &str) -> Option<&'static [&'static str; 5]> {
    let theme = theme.to_lowercase();
    KEYWORD_BANK
        .iter()
        .find(|(keyword, _)| theme.contains(keyword))
        .map(|(_, titles)| titles)
}

fn title_for(theme: &str, index: usize) -> String {
    if let Some(titles) = bank_titles(theme) {
        if let Some(title) = titles.get(index) {
            return title.to_string();
        }
    } else {
        let generic = match index {
            0 => Some(format!("Top 5 {theme} Tips for Beginners")),
            1 => Some(format!("Common {theme} Mistakes to Avoid")),
            2 => Some(format!("The Ultimate {theme} Guide")),
            3 => Some(format!("{theme} Trends You Need to Know")),
            4 => Some(format!("How {theme} Can Transform Your Life")),
            _ => None,
        };
        if let Some(title) = generic {
            return title;
        }
    }
    format!("{theme} Insight #{}: Key Strategies and Tips", index + 1)
}

fn description_for(content_type: &str, title: &str) -> String {
    let kind = content_type.to_lowercase();
    match content_type {
        "Carousel" => format!(
            "Create an engaging {kind} showcasing '{title}'. Design 3-5 slides with clear, visual information. \
             Use consistent branding with your color scheme. Include statistics, tips, or step-by-step guidance. \
             Make each slide valuable and shareable."
        ),
        "Video/Reel" => format!(
            "Produce a dynamic {kind} about '{title}'. Keep it under 60 seconds with quick cuts and engaging visuals. \
             Include text overlays for key points. Use trending audio and incorporate your brand personality. \
             Focus on actionable takeaways."
        ),
        "Story" => format!(
            "Create an interactive {kind} series about '{title}'. Use polls, questions, or quizzes to engage viewers. \
             Include behind-the-scenes content and personal insights. Add swipe-up links or action stickers for engagement."
        ),
        _ => format!(
            "Design an eye-catching {kind} featuring '{title}'. Use high-quality visuals with clear, readable text. \
             Include your brand colors and fonts. Focus on one key message with supporting details. \
             Make it scroll-stopping and shareable."
        ),
    }
}

fn hashtags_for(theme: &str) -> String {
    let tag: String = theme
        .chars()
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_lowercase();
    format!("#{tag} #socialmedia #content #marketing #tips")
}

/// Builds the record at zero-based `index`. `schedule` is used verbatim; when
/// absent the slot becomes `"Day {index+1} at 10:00 AM"`.
pub fn synthesize_post(
    _campaign_name: &str,
    theme: &str,
    index: usize,
    schedule: Option<&str>,
) -> PostRecord {
    let content_type = CONTENT_TYPES[index % CONTENT_TYPES.len()];
    let title = title_for(theme, index);

    PostRecord {
        post_number: index as u32 + 1,
        description: description_for(content_type, &title),
        title,
        content_type: content_type.to_string(),
        schedule: schedule
            .map(str::to_string)
            .unwrap_or_else(|| day_slot(index)),
        call_to_action: CALLS_TO_ACTION[index % CALLS_TO_ACTION.len()].to_string(),
        theme: theme.to_string(),
        suggested_hashtags: Some(hashtags_for(theme)),
    }
}

/// Synthesizes `count` complete posts. Deterministic and infallible.
pub fn synthesize(
    campaign_name: &str,
    theme: &str,
    count: usize,
    schedule: &[String],
) -> Vec<PostRecord> {
    info!("Synthesizing {count} fallback posts for campaign '{campaign_name}'");
    (0..count)
        .map(|i| synthesize_post(campaign_name, theme, i, schedule.get(i).map(String::as_str)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("May {:02} at 10:00 AM", i + 1)).collect()
    }

    #[test]
    fn test_keyword_bank_titles_used_for_matching_theme() {
        let posts = synthesize("EcoCampaign", "Sustainability Tips", 3, &schedule(3));
        assert_eq!(posts[0].title, "5 Simple Eco-Friendly Swaps for Your Daily Routine");
        assert_eq!(posts[1].title, "The Hidden Environmental Cost of Fast Fashion");
        assert_eq!(posts[2].title, "DIY Natural Cleaning Products That Actually Work");
    }

    #[test]
    fn test_first_keyword_in_bank_order_wins() {
        // Contains both "marketing" and "food"; marketing is earlier in the bank.
        let post = synthesize_post("c", "food marketing", 0, None);
        assert_eq!(post.title, "Content Marketing Strategies That Drive Results");
    }

    #[test]
    fn test_generic_titles_for_unknown_theme() {
        let posts = synthesize("Run", "Fitness", 5, &schedule(5));
        assert_eq!(posts[0].title, "Top 5 Fitness Tips for Beginners");
        assert_eq!(posts[2].title, "The Ultimate Fitness Guide");
        assert_eq!(posts[4].title, "How Fitness Can Transform Your Life");
    }

    #[test]
    fn test_overflow_titles_use_insight_numbering() {
        let posts = synthesize("Run", "Fitness", 7, &schedule(7));
        assert_eq!(posts[5].title, "Fitness Insight #6: Key Strategies and Tips");
        let eco = synthesize_post("c", "sustainability", 5, None);
        assert_eq!(eco.title, "sustainability Insight #6: Key Strategies and Tips");
    }

    #[test]
    fn test_content_type_and_cta_rotation() {
        let posts = synthesize("c", "food", 6, &schedule(6));
        let types: Vec<_> = posts.iter().map(|p| p.content_type.as_str()).collect();
        assert_eq!(
            types,
            ["Image Post", "Carousel", "Video/Reel", "Story", "Image Post", "Carousel"]
        );
        assert_eq!(posts[5].call_to_action, posts[0].call_to_action);
        assert_ne!(posts[4].call_to_action, posts[0].call_to_action);
    }

    #[test]
    fn test_description_names_type_and_quotes_title() {
        let post = synthesize_post("c", "food", 1, None);
        assert!(post.description.starts_with("Create an engaging carousel showcasing"));
        assert!(post.description.contains("'The Science Behind Food Cravings'"));
    }

    #[test]
    fn test_schedule_copied_and_missing_slots_labelled() {
        let posts = synthesize("c", "food", 3, &schedule(2));
        assert_eq!(posts[0].schedule, "May 01 at 10:00 AM");
        assert_eq!(posts[1].schedule, "May 02 at 10:00 AM");
        assert_eq!(posts[2].schedule, "Day 3 at 10:00 AM");
    }

    #[test]
    fn test_hashtags_collapse_theme() {
        let post = synthesize_post("c", "Plant Based Food", 0, None);
        assert_eq!(
            post.suggested_hashtags.as_deref(),
            Some("#plantbasedfood #socialmedia #content #marketing #tips")
        );
    }

    #[test]
    fn test_output_is_complete_and_deterministic() {
        let a = synthesize("c", "travel", 12, &schedule(12));
        let b = synthesize("c", "travel", 12, &schedule(12));
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        for (i, post) in a.iter().enumerate() {
            assert_eq!(post.post_number as usize, i + 1);
            assert!(post.is_complete());
        }
    }
}
