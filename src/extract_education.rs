use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{
    BlockchainEducationPayload, DifficultyLevel, Education, Explanations, LearningPath,
    LevelExplanation, ALL_LEVELS,
};

// Education replies arrive in one of two markup conventions instead of
// JSON often enough to need both handled:
//
//   Format A: "**topic:** X" plus one "**child**".."**expert**" section
//   of "**field:** value" lines each.
//
//   Format B: the topic asserted as a bold sentence ("**X is the ...**")
//   followed by "**Child:**".."**Expert:**" prose blocks.

static TOPIC_BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\*\*topic:\*\*\s*([^\n*]+)").expect("valid regex"));
static TOPIC_PLAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)topic:\s*([^\n*]+)").expect("valid regex"));
static SENTENCE_TOPIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\*\*(.*?)\s+is\s+the\s+.*?\*\*").expect("valid regex"));

const SECTION_MARKERS: [&str; 6] = ["child", "teen", "college", "grad", "expert", "learning_path"];

const LEVEL_HEADERS: [&str; 7] = [
    "**child:",
    "**teen:",
    "**college:",
    "**grad:",
    "**graduate:",
    "**expert:",
    "**learning path:",
];

pub fn extract_blockchain_education_data(raw: &str) -> Option<BlockchainEducationPayload> {
    if let Some(topic) = field_label_topic(raw) {
        return Some(extract_field_label_format(raw, topic));
    }
    extract_level_header_format(raw)
}

fn field_label_topic(raw: &str) -> Option<String> {
    TOPIC_BOLD_RE
        .captures(raw)
        .or_else(|| TOPIC_PLAIN_RE.captures(raw))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

// Format A.

fn extract_field_label_format(raw: &str, topic: String) -> BlockchainEducationPayload {
    let mut explanations = Explanations::default();
    for level in ALL_LEVELS {
        let section = extract_level_section(raw, level)
            .unwrap_or_else(|| missing_section_placeholder(level));
        explanations.set(level, section);
    }

    BlockchainEducationPayload {
        education: Education {
            topic,
            explanations,
            learning_path: Some(extract_learning_path(raw)),
        },
    }
}

fn missing_section_placeholder(level: DifficultyLevel) -> LevelExplanation {
    LevelExplanation {
        level: level.display_name().to_string(),
        explanation: format!("Unable to parse {} explanation from response", level.as_str()),
        analogy: Some("Response parsing was incomplete".to_string()),
        key_point: "Please ask again for a proper explanation".to_string(),
        ..Default::default()
    }
}

pub fn extract_level_section(text: &str, level: DifficultyLevel) -> Option<LevelExplanation> {
    let content = bold_section(text, level.as_str())?;

    Some(LevelExplanation {
        level: extract_field(content, "level")
            .unwrap_or_else(|| level.display_name().to_string()),
        explanation: extract_field(content, "explanation")
            .unwrap_or_else(|| format!("No explanation found for {} level", level.as_str())),
        analogy: extract_field(content, "analogy"),
        key_point: extract_field(content, "key_point")
            .unwrap_or_else(|| format!("No key point found for {} level", level.as_str())),
        technical_details: extract_field(content, "technical_details"),
        research_context: extract_field(content, "research_context"),
        implications: extract_field(content, "implications"),
        technical_specifications: extract_field(content, "technical_specifications"),
        mathematical_foundations: extract_field(content, "mathematical_foundations"),
        current_research: extract_field(content, "current_research"),
        practical_applications: extract_field(content, "practical_applications"),
    })
}

/// Span of a `**name**` section, ending at the next known section marker
/// or the end of the text.
fn bold_section<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let lower = text.to_ascii_lowercase();
    let marker = format!("**{name}**");
    let start = lower.find(&marker)? + marker.len();
    let rest = &lower[start..];
    let mut end = rest.len();
    for other in SECTION_MARKERS {
        let m = format!("**{other}**");
        if let Some(i) = rest.find(&m) {
            end = end.min(i);
        }
    }
    Some(&text[start..start + end])
}

/// Shared field pull: `**field:** value`, up to the next bold marker or
/// the end of the span.
pub fn extract_field(text: &str, field: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let marker = format!("**{field}:**");
    let start = lower.find(&marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find('*').unwrap_or(rest.len());
    let value = rest[..end].trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

fn extract_learning_path(text: &str) -> LearningPath {
    let lower = text.to_ascii_lowercase();
    let Some(start) = lower.find("**learning_path**") else {
        return LearningPath {
            prerequisites: vec!["Unable to parse prerequisites".to_string()],
            next_topics: vec!["Unable to parse next topics".to_string()],
            difficulty_progression: "Unable to parse difficulty progression".to_string(),
        };
    };
    let content = &text[start + "**learning_path**".len()..];

    LearningPath {
        prerequisites: comma_list(extract_field(content, "prerequisites"))
            .unwrap_or_else(|| vec!["Unable to parse prerequisites".to_string()]),
        next_topics: comma_list(extract_field(content, "next_topics"))
            .unwrap_or_else(|| vec!["Unable to parse next topics".to_string()]),
        difficulty_progression: extract_field(content, "difficulty_progression")
            .unwrap_or_else(|| "Unable to parse difficulty progression".to_string()),
    }
}

fn comma_list(field: Option<String>) -> Option<Vec<String>> {
    field.map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
}

// Format B.

fn extract_level_header_format(raw: &str) -> Option<BlockchainEducationPayload> {
    let topic = SENTENCE_TOPIC_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());

    let lower = raw.to_ascii_lowercase();
    let has_headers = lower.contains("**child:**") || lower.contains("**teen:**");
    if topic.is_none() && !has_headers {
        return None;
    }

    let mut explanations = Explanations::default();
    for level in ALL_LEVELS {
        let explanation = match level_header_content(raw, level) {
            Some(content) => synthesize_level(level, content),
            None => LevelExplanation {
                level: level.display_name().to_string(),
                explanation: format!("Unable to parse {} explanation", level.as_str()),
                analogy: Some("Response parsing was incomplete".to_string()),
                key_point: "Please ask again for a proper explanation".to_string(),
                ..Default::default()
            },
        };
        explanations.set(level, explanation);
    }

    // This format carries no itemized prerequisites or follow-up topics;
    // only the progression text is recoverable.
    let learning_path = LearningPath {
        prerequisites: vec!["Basic understanding needed".to_string()],
        next_topics: vec!["Advanced concepts".to_string()],
        difficulty_progression: learning_path_header_content(raw)
            .unwrap_or_else(|| "Progressive learning recommended".to_string()),
    };

    Some(BlockchainEducationPayload {
        education: Education {
            topic: topic.unwrap_or_else(|| "Unknown Topic".to_string()),
            explanations,
            learning_path: Some(learning_path),
        },
    })
}

fn synthesize_level(level: DifficultyLevel, content: String) -> LevelExplanation {
    let analogy = if content.contains("like") {
        content.clone()
    } else {
        format!("Think of it like: {}...", truncate_chars(&content, 100))
    };
    let key_point = first_sentence(&content);

    LevelExplanation {
        level: level.display_name().to_string(),
        explanation: content,
        analogy: Some(analogy),
        key_point,
        ..Default::default()
    }
}

fn level_header_content(text: &str, level: DifficultyLevel) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let names: &[&str] = match level {
        DifficultyLevel::Grad => &["grad", "graduate"],
        DifficultyLevel::Child => &["child"],
        DifficultyLevel::Teen => &["teen"],
        DifficultyLevel::College => &["college"],
        DifficultyLevel::Expert => &["expert"],
    };

    let start = names.iter().find_map(|name| {
        let marker = format!("**{name}:**");
        lower.find(&marker).map(|i| i + marker.len())
    })?;

    let rest = &lower[start..];
    let mut end = rest.len();
    for header in LEVEL_HEADERS {
        if let Some(i) = rest.find(header) {
            end = end.min(i);
        }
    }

    let value = text[start..start + end].trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

fn learning_path_header_content(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let marker = "**learning path:**";
    let start = lower.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find("**").unwrap_or(rest.len());
    let value = rest[..end].trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

fn first_sentence(content: &str) -> String {
    let first = content.split('.').next().unwrap_or("");
    if first.is_empty() {
        truncate_chars(content, 100)
    } else {
        first.to_string()
    }
}

fn truncate_chars(content: &str, max: usize) -> String {
    content.chars().take(max).collect()
}
