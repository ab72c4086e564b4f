use anyhow::Result;
use serde_json::Value;

use crate::helpers::HelperKind;
use crate::parser::parse_helper_response;
use crate::schema::{
    BlockchainEducationPayload, CryptoResearchPayload, TokenAnalysisPayload, TweetPayload,
    ALL_LEVELS,
};

/// Turn a parsed (or unparseable) helper reply into a displayable text
/// block. This never fails: renderer errors are caught at this boundary
/// and converted into a debug-friendly notice around the raw reply.
pub fn render_helper_response(
    helper_type: Option<&str>,
    parsed: Option<Value>,
    raw_message: &str,
) -> String {
    let helper_type = helper_type.filter(|h| !h.is_empty());

    let mut data = parsed;
    let mut parse_error: Option<String> = None;

    // A payload holding nothing but a generic `message` string is the
    // provider's plain-text wrapper; the wrapped text is re-run through
    // the recovery chain before dispatch.
    if let Some(inner) = nested_message(data.as_ref()) {
        let (recovered, error) =
            parse_helper_response(&inner, helper_type.unwrap_or_default()).into_parts();
        data = recovered;
        parse_error = error;
    } else if data.is_none() && !raw_message.is_empty() {
        let (recovered, error) =
            parse_helper_response(raw_message, helper_type.unwrap_or_default()).into_parts();
        data = recovered;
        parse_error = error;
    }

    let Some(value) = data else {
        let Some(helper) = helper_type else {
            return raw_message.to_string();
        };
        if let Some(reason) = parse_error {
            return parse_error_fallback(&reason, raw_message);
        }
        return unknown_helper_fallback(helper, raw_message);
    };

    match helper_type.and_then(HelperKind::parse) {
        Some(kind) => {
            let rendered = match kind {
                HelperKind::TweetGenerator => render_tweet(&value),
                HelperKind::TokenAnalysis => render_token_analysis(&value),
                HelperKind::CryptoResearch => render_crypto_research(&value),
                HelperKind::BlockchainEducator => render_education(&value),
            };
            match rendered {
                Ok(text) => text,
                Err(err) => rendering_error_fallback(kind.as_str(), raw_message, &value, &err),
            }
        }
        None => match helper_type {
            Some(helper) => unknown_helper_fallback(helper, raw_message),
            None => raw_message.to_string(),
        },
    }
}

fn nested_message(data: Option<&Value>) -> Option<String> {
    let obj = data?.as_object()?;
    let message = obj.get("message")?.as_str()?;
    for key in ["tweet", "analysis", "research", "education"] {
        if obj.contains_key(key) {
            return None;
        }
    }
    Some(message.to_string())
}

fn render_tweet(value: &Value) -> Result<String> {
    let payload: TweetPayload = serde_json::from_value(value.clone())?;
    let tweet = if payload.tweet.is_empty() {
        "No tweet content found"
    } else {
        payload.tweet.as_str()
    };

    let mut out = format!("Tweet:\n{tweet}\n");
    if !payload.hashtags.is_empty() {
        out.push_str(&format!("\nHashtags: {}\n", payload.hashtags.join(" ")));
    }
    if !payload.tone.is_empty() {
        out.push_str(&format!("\nTone: {}\n", capitalize(&payload.tone)));
    }
    if let Some(tips) = payload.engagement_tips.as_deref() {
        out.push_str(&format!("\nEngagement tips: {tips}\n"));
    }
    Ok(out)
}

fn render_token_analysis(value: &Value) -> Result<String> {
    let payload: TokenAnalysisPayload = serde_json::from_value(value.clone())?;
    let Some(analysis) = payload.analysis else {
        return Ok(format!(
            "[incomplete-analysis] analysis structure is missing or malformed\n\n{}\n",
            pretty(value)
        ));
    };

    let mut out = format!(
        "{} outlook | {} risk\n\nMarket cap: {}\nVolume:     {}\nHolders:    {}\n\nSummary:\n{}\n",
        capitalize(&analysis.price_prediction),
        analysis.risk_level.to_uppercase(),
        analysis.key_metrics.market_cap,
        analysis.key_metrics.volume,
        analysis.key_metrics.holders,
        analysis.summary,
    );
    if !analysis.recommendations.is_empty() {
        out.push_str("\nRecommendations:\n");
        for rec in &analysis.recommendations {
            out.push_str(&format!("- {rec}\n"));
        }
    }
    Ok(out)
}

fn render_crypto_research(value: &Value) -> Result<String> {
    let payload: CryptoResearchPayload = serde_json::from_value(value.clone())?;
    let Some(research) = payload.research else {
        return Ok(format!(
            "[incomplete-research] research structure is missing or malformed\n\n{}\n",
            pretty(value)
        ));
    };

    let project = if research.project_name.is_empty() {
        "Unknown Project"
    } else {
        research.project_name.as_str()
    };
    let category = if research.category.is_empty() {
        "Other"
    } else {
        research.category.as_str()
    };

    let overview = research.overview.as_deref().unwrap_or("No overview available");
    let mut out = format!("{project} [{category}]\n\nOverview:\n{overview}\n");

    out.push_str("\nStrengths:\n");
    for item in &research.strengths {
        out.push_str(&format!("+ {item}\n"));
    }
    out.push_str("\nWeaknesses:\n");
    for item in &research.weaknesses {
        out.push_str(&format!("- {item}\n"));
    }
    out.push_str(&format!(
        "\nMarket analysis:\n{}\n\nConclusion:\n{}\n",
        research.market_analysis, research.conclusion
    ));
    Ok(out)
}

fn render_education(value: &Value) -> Result<String> {
    let payload: BlockchainEducationPayload = serde_json::from_value(value.clone())?;
    let education = payload.education;

    let mut out = format!("Topic: {}\n", education.topic);
    for level in ALL_LEVELS {
        let Some(explanation) = education.explanations.get(level) else {
            continue;
        };
        let heading = if explanation.level.is_empty() {
            level.display_name()
        } else {
            explanation.level.as_str()
        };
        out.push_str(&format!("\n== {heading} ==\n{}\n", explanation.explanation));
        if let Some(analogy) = explanation.analogy.as_deref() {
            out.push_str(&format!("Analogy: {analogy}\n"));
        }
        for (label, detail) in [
            ("Technical details", explanation.technical_details.as_deref()),
            ("Research context", explanation.research_context.as_deref()),
            ("Implications", explanation.implications.as_deref()),
            (
                "Technical specifications",
                explanation.technical_specifications.as_deref(),
            ),
            (
                "Mathematical foundations",
                explanation.mathematical_foundations.as_deref(),
            ),
            ("Current research", explanation.current_research.as_deref()),
            (
                "Practical applications",
                explanation.practical_applications.as_deref(),
            ),
        ] {
            if let Some(detail) = detail {
                out.push_str(&format!("{label}: {detail}\n"));
            }
        }
        if !explanation.key_point.is_empty() {
            out.push_str(&format!("Key takeaway: {}\n", explanation.key_point));
        }
    }

    if let Some(path) = education.learning_path {
        out.push_str("\nLearning path:\n");
        if !path.prerequisites.is_empty() {
            out.push_str(&format!("  prerequisites: {}\n", path.prerequisites.join(", ")));
        }
        if !path.next_topics.is_empty() {
            out.push_str(&format!("  next topics:   {}\n", path.next_topics.join(", ")));
        }
        if !path.difficulty_progression.is_empty() {
            out.push_str(&format!("  progression:   {}\n", path.difficulty_progression));
        }
    }
    Ok(out)
}

fn parse_error_fallback(reason: &str, raw_message: &str) -> String {
    format!(
        "[parse-error] {reason}\n\nRaw AI response:\n{raw_message}\n\nhint: this usually means the model produced malformed JSON; try asking the helper to regenerate the response."
    )
}

fn unknown_helper_fallback(helper_type: &str, raw_message: &str) -> String {
    format!("[unknown-helper] {helper_type}\n\n{raw_message}")
}

fn rendering_error_fallback(
    helper_type: &str,
    raw_message: &str,
    value: &Value,
    err: &anyhow::Error,
) -> String {
    format!(
        "[render-error] failed to render {helper_type} response: {err}\n\nRaw AI response:\n{raw_message}\n\nParsed payload:\n{}\n",
        pretty(value)
    )
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_helper_response;

    #[test]
    fn no_helper_and_no_payload_shows_raw_text_verbatim() {
        let out = render_helper_response(None, None, "just a normal chat reply");
        assert_eq!(out, "just a normal chat reply");
    }

    #[test]
    fn parse_failure_with_helper_shows_error_panel() {
        let out = render_helper_response(Some("token-analysis"), None, "total garbage");
        assert!(out.starts_with("[parse-error]"));
        assert!(out.contains("token-analysis"));
        assert!(out.contains("total garbage"));
    }

    #[test]
    fn unknown_helper_with_payload_shows_notice_and_raw() {
        let out = render_helper_response(
            Some("meme-generator"),
            Some(json!({"anything": 1})),
            "raw body",
        );
        assert!(out.starts_with("[unknown-helper] meme-generator"));
        assert!(out.contains("raw body"));
    }

    #[test]
    fn tweet_payload_renders_fields() {
        let payload = json!({
            "tweet": "GM frens",
            "tone": "bullish",
            "hashtags": ["#BTC", "#ETH"],
        });
        let out = render_helper_response(Some("tweet-generator"), Some(payload), "raw");
        assert!(out.contains("GM frens"));
        assert!(out.contains("#BTC #ETH"));
        assert!(out.contains("Tone: Bullish"));
    }

    #[test]
    fn token_payload_missing_key_metrics_is_caught_at_the_boundary() {
        let payload = json!({
            "analysis": {
                "price_prediction": "bullish",
                "risk_level": "low",
                "summary": "fine"
            }
        });
        let out = render_helper_response(Some("token-analysis"), Some(payload), "raw body");
        assert!(out.starts_with("[render-error]"));
        assert!(out.contains("raw body"));
        assert!(out.contains("price_prediction"));
    }

    #[test]
    fn token_payload_without_analysis_renders_incomplete_notice() {
        let out = render_helper_response(
            Some("token-analysis"),
            Some(json!({"unexpected": true})),
            "raw",
        );
        assert!(out.starts_with("[incomplete-analysis]"));
    }

    #[test]
    fn nested_message_payload_is_reparsed_before_dispatch() {
        let payload = json!({"message": "{\"tweet\": \"hello\", \"tone\": \"neutral\", \"hashtags\": []}"});
        let out = render_helper_response(Some("tweet-generator"), Some(payload), "raw");
        assert!(out.contains("hello"));
        assert!(out.contains("Tone: Neutral"));
    }

    #[test]
    fn nested_plain_message_with_no_helper_falls_back_to_raw() {
        let payload = json!({"message": "no structure"});
        let out = render_helper_response(None, Some(payload), "the raw body");
        assert_eq!(out, "the raw body");
    }

    #[test]
    fn education_payload_renders_levels_and_path() {
        let payload = json!({
            "education": {
                "topic": "Consensus",
                "explanations": {
                    "child": {
                        "level": "Child (Ages 5-10)",
                        "explanation": "everyone agrees on the story",
                        "analogy": "like a class vote",
                        "key_point": "agreement matters"
                    }
                },
                "learning_path": {
                    "prerequisites": ["hashing"],
                    "next_topics": ["finality"],
                    "difficulty_progression": "start small"
                }
            }
        });
        let out = render_helper_response(Some("blockchain-educator"), Some(payload), "raw");
        assert!(out.contains("Topic: Consensus"));
        assert!(out.contains("== Child (Ages 5-10) =="));
        assert!(out.contains("like a class vote"));
        assert!(out.contains("prerequisites: hashing"));
    }

    #[test]
    fn research_payload_renders_sections() {
        let payload = json!({
            "research": {
                "project_name": "Acme Chain",
                "category": "Infrastructure",
                "overview": "an L1",
                "strengths": ["fast"],
                "weaknesses": ["young"],
                "market_analysis": "early",
                "conclusion": "watch it"
            }
        });
        let out = render_helper_response(Some("crypto-research"), Some(payload), "raw");
        assert!(out.contains("Acme Chain [Infrastructure]"));
        assert!(out.contains("+ fast"));
        assert!(out.contains("- young"));
        assert!(out.contains("watch it"));
    }

    #[test]
    fn rendering_never_panics_on_hostile_payloads() {
        for payload in [json!(null), json!("text"), json!([1, 2]), json!({"tweet": 5})] {
            let _ = render_helper_response(Some("tweet-generator"), Some(payload), "raw");
        }
    }
}
