use std::fmt;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::providers::ModelProvider;
use crate::types::{GenerateRequest, GenerateResponse, Role};

const MOCK_OK: &str = "mock: ok";
const MARKER_PREFIX: &str = "__mock_reply__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockProviderError {
    EmptyReply,
}

impl fmt::Display for MockProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyReply => {
                write!(f, "mock provider reply marker must be followed by a reply body")
            }
        }
    }
}

impl std::error::Error for MockProviderError {}

/// Deterministic provider for tests: when the latest user message starts
/// with the `__mock_reply__` marker line, the rest of that message is
/// echoed back verbatim as the assistant reply.
#[derive(Debug, Clone, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

fn extract_mock_reply(req: &GenerateRequest) -> anyhow::Result<Option<String>> {
    let latest_user = req
        .messages
        .iter()
        .rev()
        .find(|m| matches!(m.role, Role::User))
        .map(|m| m.content.as_str());
    let Some(content) = latest_user else {
        return Ok(None);
    };

    let Some((first_line, rest)) = content.split_once('\n') else {
        if content == MARKER_PREFIX {
            return Err(anyhow!(MockProviderError::EmptyReply));
        }
        return Ok(None);
    };
    if first_line != MARKER_PREFIX {
        return Ok(None);
    }
    if rest.is_empty() {
        return Err(anyhow!(MockProviderError::EmptyReply));
    }

    Ok(Some(rest.to_string()))
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn generate(&self, req: GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let content = extract_mock_reply(&req)?.unwrap_or_else(|| MOCK_OK.to_string());
        Ok(GenerateResponse {
            content,
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    fn req_with_user(content: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock-model".to_string(),
            messages: vec![Message::user(content)],
            max_tokens: 64,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn marker_absent_returns_mock_ok() {
        let provider = MockProvider::new();
        let resp = provider
            .generate(req_with_user("hello"))
            .await
            .expect("mock response");
        assert_eq!(resp.content, "mock: ok");
    }

    #[tokio::test]
    async fn marker_present_echoes_reply_body() {
        let provider = MockProvider::new();
        let resp = provider
            .generate(req_with_user("__mock_reply__\n{\"tweet\": \"hi\"}"))
            .await
            .expect("mock response");
        assert_eq!(resp.content, "{\"tweet\": \"hi\"}");
    }

    #[tokio::test]
    async fn marker_without_body_returns_typed_error() {
        let provider = MockProvider::new();
        let err = provider
            .generate(req_with_user("__mock_reply__\n"))
            .await
            .expect_err("expected empty reply error");
        let typed = err
            .downcast_ref::<MockProviderError>()
            .expect("typed mock provider error");
        assert_eq!(*typed, MockProviderError::EmptyReply);
    }
}
