use std::path::Path;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::helpers::{HelperKind, ALL_HELPERS};

// Helper personas: the system prompt each structured helper chats with.
// Built-in defaults cover the four known helpers; a YAML config file can
// override any of them. Every prompt carries a literal "Language: en."
// sentence that gets rewritten when the user asks for another language.

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersonaConfig {
    pub version: u32,
    #[serde(default)]
    pub personas: Vec<PersonaSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaSpec {
    pub helper: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub system_prompt: String,
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone)]
pub struct PersonaSet {
    personas: Vec<PersonaSpec>,
    pub config_hash_hex: Option<String>,
}

impl PersonaSet {
    pub fn builtin() -> Self {
        Self {
            personas: builtin_personas(),
            config_hash_hex: None,
        }
    }

    /// Built-ins plus overrides from a YAML config file; entries matching
    /// a known helper id replace the default persona.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let (config, hash_hex) = load_config(path)?;
        let mut personas = builtin_personas();
        for spec in config.personas {
            match personas.iter_mut().find(|p| p.helper == spec.helper) {
                Some(existing) => *existing = spec,
                None => personas.push(spec),
            }
        }
        Ok(Self {
            personas,
            config_hash_hex: Some(hash_hex),
        })
    }

    pub fn all(&self) -> &[PersonaSpec] {
        &self.personas
    }

    pub fn get(&self, kind: HelperKind) -> Option<&PersonaSpec> {
        self.personas.iter().find(|p| p.helper == kind.as_str())
    }

    pub fn system_prompt_for(&self, kind: HelperKind, language: &str) -> anyhow::Result<String> {
        let spec = self
            .get(kind)
            .ok_or_else(|| anyhow!("no persona configured for helper '{}'", kind.as_str()))?;
        Ok(inject_language(&spec.system_prompt, language))
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<(PersonaConfig, String)> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read personas config: {}", path.display()))?;
    let config: PersonaConfig = serde_yaml::from_slice(&bytes)
        .with_context(|| format!("failed to parse personas config: {}", path.display()))?;
    if config.version != 1 {
        return Err(anyhow!(
            "unsupported personas config version {} at {}",
            config.version,
            path.display()
        ));
    }
    Ok((config, sha256_hex(&bytes)))
}

/// Swap the prompt's language sentence for the requested language. Only
/// the exact "Language: en." marker is rewritten; prompts without it are
/// returned untouched.
pub fn inject_language(system_prompt: &str, language: &str) -> String {
    system_prompt.replace("Language: en.", &format!("Language: {language}."))
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn builtin_personas() -> Vec<PersonaSpec> {
    ALL_HELPERS
        .iter()
        .map(|kind| PersonaSpec {
            helper: kind.as_str().to_string(),
            display_name: kind.display_name().to_string(),
            description: builtin_description(*kind).to_string(),
            system_prompt: builtin_system_prompt(*kind).to_string(),
            default_language: default_language(),
        })
        .collect()
}

fn builtin_description(kind: HelperKind) -> &'static str {
    match kind {
        HelperKind::TweetGenerator => "Drafts crypto tweets with tone and hashtag suggestions",
        HelperKind::TokenAnalysis => "Breaks a token down into outlook, risk and key metrics",
        HelperKind::CryptoResearch => "Researches a project's strengths, weaknesses and market fit",
        HelperKind::BlockchainEducator => "Explains blockchain topics at five difficulty levels",
    }
}

fn builtin_system_prompt(kind: HelperKind) -> &'static str {
    match kind {
        HelperKind::TweetGenerator => {
            "You are a crypto tweet writer. Respond with a single JSON object and nothing else, \
             using exactly this shape: {\"tweet\": \"<tweet text under 280 characters>\", \
             \"tone\": \"bullish|bearish|neutral|humorous\", \"hashtags\": [\"#tag\", ...], \
             \"engagement_tips\": \"<optional short advice>\"}. Do not wrap the JSON in prose. \
             Language: en."
        }
        HelperKind::TokenAnalysis => {
            "You are a token analyst. Respond with a single JSON object and nothing else, using \
             exactly this shape: {\"analysis\": {\"price_prediction\": \"bullish|bearish|neutral\", \
             \"risk_level\": \"low|medium|high\", \"key_metrics\": {\"market_cap\": \"...\", \
             \"volume\": \"...\", \"holders\": \"...\"}, \"summary\": \"...\", \
             \"recommendations\": [\"...\"]}}. Do not add commentary outside the JSON. \
             Language: en."
        }
        HelperKind::CryptoResearch => {
            "You are a crypto research assistant. Respond with a single JSON object and nothing \
             else, using exactly this shape: {\"research\": {\"project_name\": \"...\", \
             \"category\": \"DeFi|NFT|Gaming|Infrastructure|Other\", \"overview\": \"...\", \
             \"strengths\": [\"...\"], \"weaknesses\": [\"...\"], \"market_analysis\": \"...\", \
             \"conclusion\": \"...\"}}. Do not add commentary outside the JSON. Language: en."
        }
        HelperKind::BlockchainEducator => {
            "You are a blockchain educator. Respond with a single JSON object and nothing else, \
             using exactly this shape: {\"education\": {\"topic\": \"...\", \"explanations\": \
             {\"child\": {\"level\": \"Child (Ages 5-10)\", \"explanation\": \"...\", \
             \"analogy\": \"...\", \"key_point\": \"...\"}, \"teen\": {...}, \"college\": \
             {... plus \"technical_details\"}, \"grad\": {... plus \"technical_details\", \
             \"research_context\", \"implications\"}, \"expert\": {... plus \
             \"technical_specifications\", \"mathematical_foundations\", \"current_research\", \
             \"practical_applications\"}}, \"learning_path\": {\"prerequisites\": [\"...\"], \
             \"next_topics\": [\"...\"], \"difficulty_progression\": \"...\"}}}. \
             Do not add commentary outside the JSON. Language: en."
        }
    }
}
