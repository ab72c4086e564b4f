use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::extract::{extract_crypto_research_data, extract_token_analysis_data, extract_tweet_data};
use crate::extract_education::extract_blockchain_education_data;
use crate::helpers::HelperKind;

/// Outcome of running a raw model reply through the recovery chain.
/// Exactly one side is ever populated: a recovered JSON value, or the
/// reason every strategy failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Parsed(Value),
    Failed { reason: String },
}

impl ParsedResponse {
    pub fn data(&self) -> Option<&Value> {
        match self {
            ParsedResponse::Parsed(value) => Some(value),
            ParsedResponse::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ParsedResponse::Parsed(_) => None,
            ParsedResponse::Failed { reason } => Some(reason),
        }
    }

    pub fn into_parts(self) -> (Option<Value>, Option<String>) {
        match self {
            ParsedResponse::Parsed(value) => (Some(value), None),
            ParsedResponse::Failed { reason } => (None, Some(reason)),
        }
    }
}

static FENCED_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").expect("valid regex")
});
static EMBEDDED_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid regex"));
static TRAILING_COMMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s*[}\]])").expect("valid regex"));
static UNESCAPED_QUOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"": "([^"]*)"([^",}\]]*)"([^"]*)","#).expect("valid regex")
});

const STRATEGIES: &[(&str, fn(&str) -> Option<Value>)] = &[
    ("full_parse", full_parse),
    ("fenced_block", fenced_block_parse),
    ("embedded_object", embedded_object_parse),
    ("cleanup", cleanup_parse),
];

/// Best-effort recovery of a structured payload from a raw model reply.
/// Strategies run in order, first success wins; the helper tag is used
/// only to pick the manual extractor of last resort, and an unrecognized
/// or empty tag skips that step entirely.
pub fn parse_helper_response(raw_message: &str, helper_type: &str) -> ParsedResponse {
    if raw_message.is_empty() {
        return ParsedResponse::Failed {
            reason: "Empty response message".to_string(),
        };
    }

    for (name, attempt) in STRATEGIES {
        if let Some(value) = attempt(raw_message) {
            debug!("strategy {name} recovered a payload");
            return ParsedResponse::Parsed(value);
        }
        debug!("strategy {name} failed");
    }

    if let Some(kind) = HelperKind::parse(helper_type) {
        if let Some(value) = manual_extraction(raw_message, kind) {
            debug!("manual {helper_type} extraction recovered a payload");
            return ParsedResponse::Parsed(value);
        }
        debug!("manual {helper_type} extraction failed");
    }

    ParsedResponse::Failed {
        reason: format!(
            "Failed to parse JSON response for {helper_type}. The AI response may contain malformed JSON."
        ),
    }
}

fn full_parse(raw: &str) -> Option<Value> {
    serde_json::from_str(raw).ok()
}

fn fenced_block_parse(raw: &str) -> Option<Value> {
    let body = FENCED_BLOCK_RE.captures(raw)?.get(1)?.as_str();
    serde_json::from_str(body).ok()
}

/// Greedy first-`{`-to-last-`}` span. Known limitation: this is not a
/// balanced-brace scan, so replies with multiple top-level objects or
/// braces inside string values can mis-span; the later strategies pick up
/// what this one mangles.
fn embedded_object_parse(raw: &str) -> Option<Value> {
    let span = EMBEDDED_OBJECT_RE.find(raw)?.as_str();
    serde_json::from_str(span).ok()
}

/// Fixed repair sequence: trim to the outermost braces, drop trailing
/// commas, then re-escape one observed inner-quote malformation. The
/// quote repair is deliberately narrow; it targets a single failure
/// pattern of the upstream model and can corrupt adjacent text that
/// merely resembles it.
fn cleanup_parse(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    let trimmed = &raw[start..=end];
    let without_commas = TRAILING_COMMA_RE.replace_all(trimmed, "${1}");
    let repaired = UNESCAPED_QUOTE_RE
        .replace_all(&without_commas, r#"": "${1}\"${2}\"${3}","#);

    serde_json::from_str(&repaired).ok()
}

fn manual_extraction(raw: &str, kind: HelperKind) -> Option<Value> {
    let value = match kind {
        HelperKind::TweetGenerator => serde_json::to_value(extract_tweet_data(raw)?),
        HelperKind::TokenAnalysis => serde_json::to_value(extract_token_analysis_data(raw)?),
        HelperKind::CryptoResearch => serde_json::to_value(extract_crypto_research_data(raw)?),
        HelperKind::BlockchainEducator => {
            serde_json::to_value(extract_blockchain_education_data(raw)?)
        }
    };
    value.ok()
}
