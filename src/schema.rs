use serde::{Deserialize, Serialize};

// Payload shapes for the four structured helpers. Tone, prediction and
// risk values are kept as free strings: the model is asked for a fixed
// vocabulary but replies are display-only and never validated beyond the
// shape needed to pick a renderer.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TweetPayload {
    #[serde(default)]
    pub tweet: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_tips: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAnalysisPayload {
    #[serde(default)]
    pub analysis: Option<TokenAnalysis>,
}

// key_metrics stays required: a payload that carries an analysis object
// without metrics is structurally unexpected and must surface through the
// render-error boundary, not silently print holes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAnalysis {
    pub price_prediction: String,
    pub risk_level: String,
    pub key_metrics: KeyMetrics,
    pub summary: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub market_cap: String,
    pub volume: String,
    pub holders: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoResearchPayload {
    #[serde(default)]
    pub research: Option<CryptoResearch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoResearch {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub market_analysis: String,
    pub conclusion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainEducationPayload {
    pub education: Education,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub topic: String,
    #[serde(default)]
    pub explanations: Explanations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_path: Option<LearningPath>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Explanations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<LevelExplanation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teen: Option<LevelExplanation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<LevelExplanation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grad: Option<LevelExplanation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert: Option<LevelExplanation>,
}

impl Explanations {
    pub fn get(&self, level: DifficultyLevel) -> Option<&LevelExplanation> {
        match level {
            DifficultyLevel::Child => self.child.as_ref(),
            DifficultyLevel::Teen => self.teen.as_ref(),
            DifficultyLevel::College => self.college.as_ref(),
            DifficultyLevel::Grad => self.grad.as_ref(),
            DifficultyLevel::Expert => self.expert.as_ref(),
        }
    }

    pub fn set(&mut self, level: DifficultyLevel, value: LevelExplanation) {
        match level {
            DifficultyLevel::Child => self.child = Some(value),
            DifficultyLevel::Teen => self.teen = Some(value),
            DifficultyLevel::College => self.college = Some(value),
            DifficultyLevel::Grad => self.grad = Some(value),
            DifficultyLevel::Expert => self.expert = Some(value),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelExplanation {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analogy: Option<String>,
    #[serde(default)]
    pub key_point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implications: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_specifications: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mathematical_foundations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_research: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practical_applications: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningPath {
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub next_topics: Vec<String>,
    #[serde(default)]
    pub difficulty_progression: String,
}

/// The five fixed audience levels of an education payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyLevel {
    Child,
    Teen,
    College,
    Grad,
    Expert,
}

pub const ALL_LEVELS: [DifficultyLevel; 5] = [
    DifficultyLevel::Child,
    DifficultyLevel::Teen,
    DifficultyLevel::College,
    DifficultyLevel::Grad,
    DifficultyLevel::Expert,
];

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Child => "child",
            DifficultyLevel::Teen => "teen",
            DifficultyLevel::College => "college",
            DifficultyLevel::Grad => "grad",
            DifficultyLevel::Expert => "expert",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DifficultyLevel::Child => "Child (Ages 5-10)",
            DifficultyLevel::Teen => "Teen (Ages 13-17)",
            DifficultyLevel::College => "College Student (Ages 18-22)",
            DifficultyLevel::Grad => "Graduate Student (Ages 22+)",
            DifficultyLevel::Expert => "Expert/Professional",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tweet_payload_tolerates_missing_fields() {
        let payload: TweetPayload = serde_json::from_str("{}").expect("deserialize");
        assert!(payload.tweet.is_empty());
        assert!(payload.hashtags.is_empty());
        assert!(payload.engagement_tips.is_none());
    }

    #[test]
    fn token_analysis_requires_key_metrics() {
        let raw = r#"{"analysis": {"price_prediction": "bullish", "risk_level": "low", "summary": "fine"}}"#;
        assert!(serde_json::from_str::<TokenAnalysisPayload>(raw).is_err());
    }

    #[test]
    fn token_analysis_wrapper_tolerates_absent_analysis() {
        let payload: TokenAnalysisPayload = serde_json::from_str("{}").expect("deserialize");
        assert!(payload.analysis.is_none());
    }

    #[test]
    fn level_display_names_are_fixed() {
        assert_eq!(DifficultyLevel::Child.display_name(), "Child (Ages 5-10)");
        assert_eq!(DifficultyLevel::Expert.display_name(), "Expert/Professional");
    }
}
