use helperchat::parser::parse_helper_response;
use helperchat::render::render_helper_response;
use serde_json::json;

#[test]
fn well_formed_json_matches_native_parse_for_every_schema() {
    let samples = [
        (
            "tweet-generator",
            r##"{"tweet": "GM frens", "tone": "bullish", "hashtags": ["#BTC", "#ETH"]}"##,
        ),
        (
            "token-analysis",
            r#"{"analysis": {"price_prediction": "neutral", "risk_level": "medium", "key_metrics": {"market_cap": "$1B", "volume": "$5M", "holders": "10k"}, "summary": "steady", "recommendations": ["hold"]}}"#,
        ),
        (
            "crypto-research",
            r#"{"research": {"project_name": "Acme", "category": "DeFi", "overview": "a dex", "strengths": ["liquid"], "weaknesses": ["new"], "market_analysis": "crowded", "conclusion": "promising"}}"#,
        ),
        (
            "blockchain-educator",
            r#"{"education": {"topic": "Hashing", "explanations": {}, "learning_path": {"prerequisites": [], "next_topics": [], "difficulty_progression": "easy"}}}"#,
        ),
    ];

    for (helper, raw) in samples {
        let expected: serde_json::Value = serde_json::from_str(raw).expect("native parse");
        let result = parse_helper_response(raw, helper);
        assert_eq!(result.data(), Some(&expected), "helper {helper}");

        let fenced = format!("```json\n{raw}\n```");
        let result = parse_helper_response(&fenced, helper);
        assert_eq!(result.data(), Some(&expected), "fenced helper {helper}");
    }
}

#[test]
fn empty_input_fails_for_any_helper_tag() {
    for helper in ["tweet-generator", "blockchain-educator", "unknown", ""] {
        let result = parse_helper_response("", helper);
        assert_eq!(result.error(), Some("Empty response message"));
    }
}

#[test]
fn trailing_commas_recover_to_the_comma_free_parse() {
    let with_commas = r#"{"research": {"project_name": "Acme", "strengths": ["a", "b",], "weaknesses": [],},}"#;
    let without = r#"{"research": {"project_name": "Acme", "strengths": ["a", "b"], "weaknesses": []}}"#;
    let expected: serde_json::Value = serde_json::from_str(without).expect("native parse");

    let result = parse_helper_response(with_commas, "crypto-research");
    assert_eq!(result.data(), Some(&expected));
}

#[test]
fn tweet_manual_extraction_fills_defaults() {
    let raw = r#"oops the model broke "tweet": "Hello world" mid-reply"#;
    let result = parse_helper_response(raw, "tweet-generator");
    let data = result.data().expect("payload");
    assert_eq!(data["tweet"], "Hello world");
    assert_eq!(data["tone"], "neutral");
    assert_eq!(data["hashtags"], json!([]));
}

#[test]
fn education_format_a_recovers_topic_and_child_level() {
    let raw = "**topic:** Consensus\n**child**\n**explanation:** kids explanation\n";
    let result = parse_helper_response(raw, "blockchain-educator");
    let data = result.data().expect("payload");
    assert_eq!(data["education"]["topic"], "Consensus");
    assert_eq!(
        data["education"]["explanations"]["child"]["explanation"],
        "kids explanation"
    );
    for level in ["teen", "college", "grad", "expert"] {
        let explanation = data["education"]["explanations"][level]["explanation"]
            .as_str()
            .expect("placeholder explanation");
        assert!(
            explanation.contains("Unable to parse"),
            "level {level}: {explanation}"
        );
    }
}

#[test]
fn education_format_b_recovers_from_bold_level_headers() {
    let raw = "**Child:** Simple text.\n**Teen:** more text.\n";
    let result = parse_helper_response(raw, "blockchain-educator");
    let data = result.data().expect("payload");
    let child = data["education"]["explanations"]["child"]["explanation"]
        .as_str()
        .expect("child explanation");
    assert!(child.starts_with("Simple text."));
}

#[test]
fn parse_is_idempotent_over_representative_inputs() {
    let inputs = [
        r#"{"tweet": "hi"}"#,
        "```json\n{\"analysis\": {\"summary\": \"x\",}}\n```",
        "**topic:** Forks\n**child**\n**explanation:** chains split\n",
        "not structured at all",
        "",
    ];
    for raw in inputs {
        for helper in ["tweet-generator", "blockchain-educator"] {
            let first = parse_helper_response(raw, helper);
            let second = parse_helper_response(raw, helper);
            assert_eq!(first, second, "input {raw:?} helper {helper}");
        }
    }
}

#[test]
fn rendering_a_payload_with_missing_nested_fields_never_panics() {
    let payload = json!({
        "analysis": {
            "price_prediction": "bullish",
            "risk_level": "low",
            "summary": "fine"
        }
    });
    let out = render_helper_response(Some("token-analysis"), Some(payload), "raw reply");
    assert!(out.starts_with("[render-error]"));
    assert!(out.contains("raw reply"));
}

#[test]
fn unparseable_reply_renders_error_panel_with_raw_text() {
    let out = render_helper_response(Some("crypto-research"), None, "plain prose reply");
    assert!(out.starts_with("[parse-error]"));
    assert!(out.contains("crypto-research"));
    assert!(out.contains("plain prose reply"));
}
