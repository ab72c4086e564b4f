use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{
    CryptoResearch, CryptoResearchPayload, KeyMetrics, TokenAnalysis, TokenAnalysisPayload,
    TweetPayload,
};

// Field pulls against the raw (often half-JSON) reply text. Each helper
// extractor is a last-resort recovery path: it only has to salvage what a
// quoted-field match can see, and substitutes flagged placeholders for the
// rest so downstream rendering never meets a hole.

static TWEET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"tweet":\s*"([^"]+)""#).expect("valid regex"));
static TONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"tone":\s*"([^"]+)""#).expect("valid regex"));
static HASHTAGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"hashtags":\s*\[(.*?)\]"#).expect("valid regex"));

static PREDICTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"price_prediction":\s*"([^"]+)""#).expect("valid regex"));
static RISK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"risk_level":\s*"([^"]+)""#).expect("valid regex"));
static SUMMARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"summary":\s*"([^"]+)""#).expect("valid regex"));

static PROJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"project_name":\s*"([^"]+)""#).expect("valid regex"));
static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"category":\s*"([^"]+)""#).expect("valid regex"));
static OVERVIEW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"overview":\s*"([^"]+)""#).expect("valid regex"));
static CONCLUSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"conclusion":\s*"([^"]+)""#).expect("valid regex"));

fn quoted_field(re: &Regex, raw: &str) -> Option<String> {
    re.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Tweet recovery. The tweet text itself is the one non-negotiable field;
/// tone and hashtags degrade to defaults.
pub fn extract_tweet_data(raw: &str) -> Option<TweetPayload> {
    let tweet = quoted_field(&TWEET_RE, raw)?;
    let hashtags = quoted_field(&HASHTAGS_RE, raw)
        .map(|list| {
            list.split(',')
                .map(|tag| tag.trim().replace('"', ""))
                .filter(|tag| !tag.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Some(TweetPayload {
        tweet,
        tone: quoted_field(&TONE_RE, raw).unwrap_or_else(|| "neutral".to_string()),
        hashtags,
        engagement_tips: Some(
            "Response parsing was incomplete - content may be truncated".to_string(),
        ),
    })
}

/// Token-analysis recovery. Any one of prediction, risk or summary is
/// enough to build a payload; metrics are never regex-recoverable here.
pub fn extract_token_analysis_data(raw: &str) -> Option<TokenAnalysisPayload> {
    let prediction = quoted_field(&PREDICTION_RE, raw);
    let risk = quoted_field(&RISK_RE, raw);
    let summary = quoted_field(&SUMMARY_RE, raw);

    if prediction.is_none() && risk.is_none() && summary.is_none() {
        return None;
    }

    Some(TokenAnalysisPayload {
        analysis: Some(TokenAnalysis {
            price_prediction: prediction.unwrap_or_else(|| "neutral".to_string()),
            risk_level: risk.unwrap_or_else(|| "medium".to_string()),
            summary: summary
                .unwrap_or_else(|| "Unable to parse full analysis from malformed response".to_string()),
            key_metrics: KeyMetrics {
                market_cap: "Unknown".to_string(),
                volume: "Unknown".to_string(),
                holders: "Unknown".to_string(),
            },
            recommendations: vec![
                "Response parsing failed - please verify analysis independently".to_string(),
            ],
        }),
    })
}

/// Crypto-research recovery. Needs at least a project name or an overview.
pub fn extract_crypto_research_data(raw: &str) -> Option<CryptoResearchPayload> {
    let project = quoted_field(&PROJECT_RE, raw);
    let overview = quoted_field(&OVERVIEW_RE, raw);

    if project.is_none() && overview.is_none() {
        return None;
    }

    Some(CryptoResearchPayload {
        research: Some(CryptoResearch {
            project_name: project.unwrap_or_else(|| "Unknown Project".to_string()),
            category: quoted_field(&CATEGORY_RE, raw).unwrap_or_else(|| "Other".to_string()),
            overview: Some(overview.unwrap_or_else(|| {
                "Unable to parse project overview from malformed response".to_string()
            })),
            strengths: vec!["Response parsing was incomplete".to_string()],
            weaknesses: vec!["Unable to parse detailed analysis".to_string()],
            market_analysis: "Analysis incomplete due to parsing errors".to_string(),
            conclusion: quoted_field(&CONCLUSION_RE, raw).unwrap_or_else(|| {
                "Please verify research independently due to parsing issues".to_string()
            }),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tweet_requires_tweet_field() {
        assert!(extract_tweet_data(r##""tone": "bullish", "hashtags": ["#BTC"]"##).is_none());
    }

    #[test]
    fn tweet_alone_gets_defaults() {
        let payload = extract_tweet_data(r#"something "tweet": "Hello world" trailing"#)
            .expect("tweet payload");
        assert_eq!(payload.tweet, "Hello world");
        assert_eq!(payload.tone, "neutral");
        assert!(payload.hashtags.is_empty());
        assert!(payload
            .engagement_tips
            .as_deref()
            .expect("tips")
            .contains("incomplete"));
    }

    #[test]
    fn tweet_hashtags_are_split_and_quote_stripped() {
        let payload = extract_tweet_data(
            r##""tweet": "GM", "tone": "bullish", "hashtags": ["#BTC", "#ETH"]"##,
        )
        .expect("tweet payload");
        assert_eq!(payload.tone, "bullish");
        assert_eq!(payload.hashtags, vec!["#BTC", "#ETH"]);
    }

    #[test]
    fn tweet_empty_hashtag_list_yields_no_tags() {
        let payload =
            extract_tweet_data(r#""tweet": "GM", "hashtags": []"#).expect("tweet payload");
        assert!(payload.hashtags.is_empty());
    }

    #[test]
    fn token_analysis_succeeds_on_any_single_field() {
        let payload =
            extract_token_analysis_data(r#""risk_level": "high" and nothing else"#)
                .expect("analysis payload");
        let analysis = payload.analysis.expect("analysis");
        assert_eq!(analysis.price_prediction, "neutral");
        assert_eq!(analysis.risk_level, "high");
        assert!(analysis.summary.contains("Unable to parse"));
        assert_eq!(analysis.key_metrics.market_cap, "Unknown");
        assert_eq!(analysis.recommendations.len(), 1);
    }

    #[test]
    fn token_analysis_rejects_text_without_known_fields() {
        assert!(extract_token_analysis_data("the token looks fine to me").is_none());
    }

    #[test]
    fn research_needs_project_or_overview() {
        assert!(extract_crypto_research_data(r#""category": "DeFi""#).is_none());
        let payload = extract_crypto_research_data(r#""overview": "An L2 rollup""#)
            .expect("research payload");
        let research = payload.research.expect("research");
        assert_eq!(research.project_name, "Unknown Project");
        assert_eq!(research.category, "Other");
        assert_eq!(research.overview.as_deref(), Some("An L2 rollup"));
        assert_eq!(research.strengths.len(), 1);
    }
}
