use async_trait::async_trait;

use crate::types::{GenerateRequest, GenerateResponse};

pub mod fireworks;
pub mod mock;

#[async_trait]
pub trait ModelProvider {
    async fn generate(&self, req: GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Fireworks,
    Mock,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fireworks" => Some(ProviderKind::Fireworks),
            "mock" => Some(ProviderKind::Mock),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Fireworks => "fireworks",
            ProviderKind::Mock => "mock",
        }
    }
}
