use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::providers::ModelProvider;
use crate::types::{GenerateRequest, GenerateResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.fireworks.ai/inference/v1";
pub const DEFAULT_MODEL: &str =
    "accounts/sentientfoundation-serverless/models/dobby-mini-unhinged-plus-llama-3-1-8b";
pub const API_KEY_ENV: &str = "FIREWORKS_API_KEY";

/// Chat-completions client for Fireworks-compatible endpoints.
pub struct FireworksProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FireworksProvider {
    pub fn new(base_url: &str, api_key: String, timeout_ms: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms.max(1)))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_env(base_url: &str, timeout_ms: u64) -> anyhow::Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| anyhow!("{API_KEY_ENV} is not set; export it or use --provider mock"))?;
        Self::new(base_url, api_key, timeout_ms)
    }
}

#[async_trait]
impl ModelProvider for FireworksProvider {
    async fn generate(&self, req: GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": req.model,
            "max_tokens": req.max_tokens,
            "top_p": 1,
            "top_k": 40,
            "presence_penalty": 0,
            "frequency_penalty": 0,
            "temperature": req.temperature,
            "messages": req.messages,
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("chat completion request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "chat completion failed with status {status}: {}",
                compact_error_detail(&detail)
            ));
        }

        let value: Value = resp
            .json()
            .await
            .context("failed to decode chat completion response body")?;

        let content = value
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| anyhow!("invalid response from AI service: missing message content"))?;

        let usage = value
            .get("usage")
            .and_then(|u| serde_json::from_value(u.clone()).ok());

        Ok(GenerateResponse {
            content: content.to_string(),
            usage,
        })
    }
}

fn compact_error_detail(detail: &str) -> String {
    let compact = detail.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.chars().count() <= 200 {
        return compact;
    }
    let mut out: String = compact.chars().take(197).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::compact_error_detail;

    #[test]
    fn error_detail_is_whitespace_collapsed_and_bounded() {
        assert_eq!(compact_error_detail("a\n  b\tc"), "a b c");
        let long = "x".repeat(500);
        let out = compact_error_detail(&long);
        assert_eq!(out.chars().count(), 200);
        assert!(out.ends_with("..."));
    }
}
