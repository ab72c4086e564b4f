/// The closed set of helper personas that return structured JSON payloads.
/// Anything else (or no helper at all) is treated as a plain chat reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperKind {
    TweetGenerator,
    TokenAnalysis,
    CryptoResearch,
    BlockchainEducator,
}

pub const ALL_HELPERS: [HelperKind; 4] = [
    HelperKind::TweetGenerator,
    HelperKind::TokenAnalysis,
    HelperKind::CryptoResearch,
    HelperKind::BlockchainEducator,
];

impl HelperKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tweet-generator" => Some(HelperKind::TweetGenerator),
            "token-analysis" => Some(HelperKind::TokenAnalysis),
            "crypto-research" => Some(HelperKind::CryptoResearch),
            "blockchain-educator" => Some(HelperKind::BlockchainEducator),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HelperKind::TweetGenerator => "tweet-generator",
            HelperKind::TokenAnalysis => "token-analysis",
            HelperKind::CryptoResearch => "crypto-research",
            HelperKind::BlockchainEducator => "blockchain-educator",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HelperKind::TweetGenerator => "Tweet Generator",
            HelperKind::TokenAnalysis => "Token Analysis",
            HelperKind::CryptoResearch => "Crypto Research",
            HelperKind::BlockchainEducator => "Blockchain Educator",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HelperKind, ALL_HELPERS};

    #[test]
    fn parse_round_trips_every_known_helper() {
        for kind in ALL_HELPERS {
            assert_eq!(HelperKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn parse_rejects_unknown_and_empty_tags() {
        assert_eq!(HelperKind::parse("meme-generator"), None);
        assert_eq!(HelperKind::parse(""), None);
    }
}
