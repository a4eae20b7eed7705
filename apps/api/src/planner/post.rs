use serde::{Deserialize, Serialize};

/// Recommended post formats. The field is an open string: generated text may
/// name other formats and they are kept as written.
pub const CONTENT_TYPES: [&str; 4] = ["Image Post", "Carousel", "Video/Reel", "Story"];

pub const DEFAULT_CONTENT_TYPE: &str = "Image Post";
pub const DEFAULT_CALL_TO_ACTION: &str = "Engage with this post!";

/// One scheduled social post. Every field is non-empty once the planner
/// returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub post_number: u32,
    pub title: String,
    pub content_type: String,
    /// Display string, e.g. "May 25 at 10:00 AM".
    pub schedule: String,
    pub description: String,
    pub call_to_action: String,
    pub theme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_hashtags: Option<String>,
}

impl PostRecord {
    /// True when every required field carries text.
    pub fn is_complete(&self) -> bool {
        self.post_number > 0
            && [
                &self.title,
                &self.content_type,
                &self.schedule,
                &self.description,
                &self.call_to_action,
                &self.theme,
            ]
            .iter()
            .all(|f| !f.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PostRecord {
        PostRecord {
            post_number: 1,
            title: "Title".to_string(),
            content_type: "Carousel".to_string(),
            schedule: "May 01 at 10:00 AM".to_string(),
            description: "Body".to_string(),
            call_to_action: "Comment below".to_string(),
            theme: "food".to_string(),
            suggested_hashtags: None,
        }
    }

    #[test]
    fn test_complete_record() {
        assert!(record().is_complete());
    }

    #[test]
    fn test_blank_field_is_incomplete() {
        let mut r = record();
        r.call_to_action = "   ".to_string();
        assert!(!r.is_complete());
    }

    #[test]
    fn test_hashtags_omitted_when_absent() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("suggested_hashtags").is_none());
        assert_eq!(json["post_number"], 1);
    }
}
