//! Free-Text Post Parser: turns LLM prose into partial post records.
//!
//! Two layers, both data-driven:
//! 1. Section splitting: `SPLIT_STRATEGIES` is tried in priority order and the
//!    first strategy producing a non-empty section wins. Strategies are never
//!    merged. If none match, a line scan opens a section at every numbered line.
//! 2. Field extraction: each section line is matched against `FIELD_PATTERNS`
//!    (synonym headers per field), then against a bare-date fallback.
//!
//! The parser never fails loudly. `None` means "nothing usable", which callers
//! treat exactly like a failed generation.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::planner::post::{PostRecord, DEFAULT_CALL_TO_ACTION, DEFAULT_CONTENT_TYPE};

// ────────────────────────────────────────────────────────────────────────────
// Output model
// ────────────────────────────────────────────────────────────────────────────

/// A post as recovered from free text. Missing fields stay `None`; the
/// orchestrator fills them before anything leaves the planner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPost {
    pub post_number: u32,
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub call_to_action: Option<String>,
}

impl ParsedPost {
    fn new(post_number: u32) -> Self {
        Self {
            post_number,
            ..Default::default()
        }
    }

    fn has_content(&self) -> bool {
        self.title.is_some()
            || self.content_type.is_some()
            || self.schedule.is_some()
            || self.description.is_some()
            || self.call_to_action.is_some()
    }

    /// Completes the record with defaults. `schedule` is the authoritative slot
    /// and always replaces whatever date the text restated.
    pub fn into_record(self, theme: &str, schedule: String) -> PostRecord {
        let n = self.post_number;
        PostRecord {
            post_number: n,
            title: self.title.unwrap_or_else(|| format!("Post {n}")),
            content_type: self
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            schedule,
            description: self.description.unwrap_or_else(|| {
                format!(
                    "Create engaging content about {theme}. This is post {n} focusing on delivering value to your audience."
                )
            }),
            call_to_action: self
                .call_to_action
                .unwrap_or_else(|| DEFAULT_CALL_TO_ACTION.to_string()),
            theme: theme.to_string(),
            suggested_hashtags: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section splitting strategies
// ────────────────────────────────────────────────────────────────────────────

/// A named splitting regex. Capture group 1 must be the post number.
pub struct SplitStrategy {
    pub name: &'static str,
    pub pattern: Regex,
}

impl SplitStrategy {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("split strategy pattern must compile"),
        }
    }

    /// Splits `text` at every match. Content runs from the end of one match to
    /// the start of the next. Empty sections are discarded.
    pub fn split(&self, text: &str) -> Vec<(u32, String)> {
        let matches: Vec<_> = self.pattern.captures_iter(text).collect();
        let mut sections = Vec::new();

        for (i, caps) in matches.iter().enumerate() {
            let Some(whole) = caps.get(0) else { continue };
            let post_number = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(i as u32 + 1);
            let end = matches
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(text.len());

            let content = text[whole.end()..end].trim();
            if !content.is_empty() {
                sections.push((post_number, content.to_string()));
            }
        }

        sections
    }
}

/// Priority order matters: the most specific header shape comes first.
pub static SPLIT_STRATEGIES: Lazy<Vec<SplitStrategy>> = Lazy::new(|| {
    vec![
        SplitStrategy::new("post_header_line", r"(?im)Post\s+(\d+)\s*[:.]?\s*\n"),
        SplitStrategy::new("numbered_post", r"(?im)(\d+)[.)]\s*Post\b"),
        SplitStrategy::new("bare_post", r"(?im)Post\s+(\d+)"),
        SplitStrategy::new("numbered_list", r"(?m)(\d+)[.)]"),
    ]
});

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:Post\s+)?\d+[.):]?").expect("numbered line pattern"));

/// Last-resort splitter for malformed numbering. Sections are keyed by a
/// running counter, not the number printed in the text.
fn split_by_numbered_lines(text: &str) -> Vec<(u32, String)> {
    let mut sections = Vec::new();
    let mut counter = 0u32;
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if NUMBERED_LINE.is_match(line) {
            if let Some(lines) = current.take() {
                sections.push((counter, lines.join("\n")));
            }
            counter += 1;
            current = Some(vec![line]);
        } else if let Some(lines) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some(lines) = current {
        sections.push((counter, lines.join("\n")));
    }

    sections
}

/// Runs the strategy cascade. Returns the sections of the first strategy that
/// yields any, falling back to the line scan.
pub fn split_sections(text: &str) -> Vec<(u32, String)> {
    for strategy in SPLIT_STRATEGIES.iter() {
        let sections = strategy.split(text);
        if !sections.is_empty() {
            info!(
                "Split generated text into {} sections using '{}'",
                sections.len(),
                strategy.name
            );
            return sections;
        }
    }

    warn!("No post headers found in generated text, falling back to line scan");
    split_by_numbered_lines(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Field extraction
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    ContentType,
    Schedule,
    Description,
    CallToAction,
}

struct FieldPattern {
    field: Field,
    pattern: Regex,
}

impl FieldPattern {
    fn new(field: Field, pattern: &str) -> Self {
        Self {
            field,
            pattern: Regex::new(pattern).expect("field pattern must compile"),
        }
    }
}

/// Header synonyms per field, optionally prefixed by the field's ordinal.
/// Content Type is listed before Description so "Content Type:" never reads
/// as a "Content:" description header.
static FIELD_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    use Field::*;
    vec![
        FieldPattern::new(Title, r"(?i)^1\.\s*(?:What to Post|Title)[:：]?\s*(.*)$"),
        FieldPattern::new(Title, r"(?i)^What to Post[:：]?\s*(.*)$"),
        FieldPattern::new(Title, r"(?i)^Title[:：]?\s*(.*)$"),
        FieldPattern::new(
            ContentType,
            r"(?i)^2\.\s*(?:Type of Post|Content Type|Post Type)[:：]?\s*(.*)$",
        ),
        FieldPattern::new(ContentType, r"(?i)^Type of Post[:：]?\s*(.*)$"),
        FieldPattern::new(ContentType, r"(?i)^Content Type[:：]?\s*(.*)$"),
        FieldPattern::new(ContentType, r"(?i)^Post Type[:：]?\s*(.*)$"),
        FieldPattern::new(
            Schedule,
            r"(?i)^3\.\s*(?:Posting Schedule|Schedule|Time)[:：]?\s*(.*)$",
        ),
        FieldPattern::new(Schedule, r"(?i)^Posting Schedule[:：]?\s*(.*)$"),
        FieldPattern::new(Schedule, r"(?i)^Schedule[:：]?\s*(.*)$"),
        FieldPattern::new(
            Description,
            r"(?i)^4\.\s*(?:Description|Content|Details)[:：]?\s*(.*)$",
        ),
        FieldPattern::new(Description, r"(?i)^Description[:：]?\s*(.*)$"),
        FieldPattern::new(Description, r"(?i)^Content[:：]?\s*(.*)$"),
        FieldPattern::new(
            CallToAction,
            r"(?i)^5\.\s*(?:Call.to.Action|CTA)[:：]?\s*(.*)$",
        ),
        FieldPattern::new(CallToAction, r"(?i)^Call.to.Action[:：]?\s*(.*)$"),
        FieldPattern::new(CallToAction, r"(?i)^CTA[:：]?\s*(.*)$"),
    ]
});

/// Month name + day, optionally followed by a clock time, anywhere in a line.
/// Case-insensitive; a stray date only matters until the slot is overwritten.
static BARE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}\b(?:\s+at\s+\d{1,2}:\d{2}\s*[AaPp][Mm])?",
    )
    .expect("bare date pattern")
});

fn match_header(line: &str) -> Option<(Field, String)> {
    FIELD_PATTERNS.iter().find_map(|fp| {
        fp.pattern.captures(line).map(|caps| {
            let value = caps
                .get(1)
                .map(|m| m.as_str())
                .unwrap_or("")
                .trim_start_matches([':', '：'])
                .trim()
                .to_string();
            (fp.field, value)
        })
    })
}

/// Extracts the five logical fields from one section's text.
pub fn parse_section(post_number: u32, content: &str) -> ParsedPost {
    let mut post = ParsedPost::new(post_number);
    let mut current: Option<Field> = None;
    let mut description_lines: Vec<String> = Vec::new();

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((field, value)) = match_header(line) {
            current = Some(field);
            let value = (!value.is_empty()).then_some(value);
            match field {
                Field::Title => post.title = value.or(post.title.take()),
                Field::ContentType => post.content_type = value.or(post.content_type.take()),
                Field::Schedule => post.schedule = value.or(post.schedule.take()),
                Field::CallToAction => {
                    post.call_to_action = value.or(post.call_to_action.take())
                }
                Field::Description => description_lines = value.into_iter().collect(),
            }
            continue;
        }

        if post.schedule.is_none() {
            if let Some(m) = BARE_DATE.find(line) {
                post.schedule = Some(m.as_str().to_string());
                if current != Some(Field::Description) {
                    continue;
                }
            }
        }

        if current == Some(Field::Description) {
            description_lines.push(line.to_string());
        }
    }

    if !description_lines.is_empty() {
        post.description = Some(description_lines.join(" "));
    }

    post
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Removes markdown emphasis that LLMs sprinkle around headers.
fn strip_emphasis(raw: &str) -> String {
    raw.replace("**", "").replace('*', "").trim().to_string()
}

/// Parses generated text into partial posts, in section order.
///
/// Returns `None` when no section yields a single recognisable field.
pub fn parse_posts(raw: &str) -> Option<Vec<ParsedPost>> {
    let cleaned = strip_emphasis(raw);
    if cleaned.is_empty() {
        return None;
    }

    let posts: Vec<ParsedPost> = split_sections(&cleaned)
        .into_iter()
        .map(|(number, content)| parse_section(number, &content))
        .filter(|post| {
            let keep = post.has_content();
            if !keep {
                debug!("Dropping section {} with no recognisable fields", post.post_number);
            }
            keep
        })
        .collect();

    if posts.is_empty() {
        warn!("Generated text produced no usable posts");
        None
    } else {
        info!("Parsed {} posts from generated text", posts.len());
        Some(posts)
    }
}
