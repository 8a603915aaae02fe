//! Supported hosted model identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EthosError;

/// Models offered by the Groq chat completions API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GroqModel {
    /// Large general-purpose model
    #[default]
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama33Versatile,
    /// Fast, small model
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama31Instant,
    #[serde(rename = "mixtral-8x7b-32768")]
    Mixtral8x7b,
    #[serde(rename = "gemma2-9b-it")]
    Gemma2It,
}

impl GroqModel {
    /// All models, in selector order
    pub const ALL: [GroqModel; 4] = [
        GroqModel::Llama33Versatile,
        GroqModel::Llama31Instant,
        GroqModel::Mixtral8x7b,
        GroqModel::Gemma2It,
    ];

    /// API identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            GroqModel::Llama33Versatile => "llama-3.3-70b-versatile",
            GroqModel::Llama31Instant => "llama-3.1-8b-instant",
            GroqModel::Mixtral8x7b => "mixtral-8x7b-32768",
            GroqModel::Gemma2It => "gemma2-9b-it",
        }
    }

    /// Short human description for listings
    pub fn description(&self) -> &'static str {
        match self {
            GroqModel::Llama33Versatile => "Llama 3.3 70B, general purpose",
            GroqModel::Llama31Instant => "Llama 3.1 8B, fast responses",
            GroqModel::Mixtral8x7b => "Mixtral 8x7B, 32k context",
            GroqModel::Gemma2It => "Gemma 2 9B instruction tuned",
        }
    }
}

impl fmt::Display for GroqModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroqModel {
    type Err = EthosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroqModel::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| EthosError::UnknownModel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_models() {
        for model in GroqModel::ALL {
            assert_eq!(model.as_str().parse::<GroqModel>().unwrap(), model);
        }
    }

    #[test]
    fn test_parse_unknown_model() {
        let err = "gpt-4o".parse::<GroqModel>().unwrap_err();
        assert!(matches!(err, EthosError::UnknownModel(ref m) if m == "gpt-4o"));
    }

    #[test]
    fn test_default_is_versatile() {
        assert_eq!(GroqModel::default().as_str(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_serde_uses_api_ids() {
        let json = serde_json::to_string(&GroqModel::Llama31Instant).unwrap();
        assert_eq!(json, "\"llama-3.1-8b-instant\"");
    }
}
