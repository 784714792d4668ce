//! Structured risk verdict produced by an LLM provider.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Scores below this are conventionally `allow`.
pub const REVIEW_THRESHOLD: f64 = 0.3;
/// Scores at or above this are conventionally `block`.
pub const BLOCK_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedAction {
    Allow,
    Review,
    Block,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::Allow => "allow",
            RecommendedAction::Review => "review",
            RecommendedAction::Block => "block",
        }
    }

    /// Conventional action for a score: allow < 0.3 <= review < 0.7 <= block.
    pub fn for_score(score: f64) -> Self {
        if score >= BLOCK_THRESHOLD {
            RecommendedAction::Block
        } else if score >= REVIEW_THRESHOLD {
            RecommendedAction::Review
        } else {
            RecommendedAction::Allow
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendedAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(RecommendedAction::Allow),
            "review" => Ok(RecommendedAction::Review),
            "block" => Ok(RecommendedAction::Block),
            other => Err(format!(
                "unknown recommended_action '{}', expected allow, review or block",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for RecommendedAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Error, Debug)]
pub enum VerdictError {
    #[error("verdict does not match schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("risk_score {0} is outside [0.0, 1.0]")]
    ScoreOutOfRange(f64),

    #[error("reasoning must not be empty")]
    EmptyReasoning,
}

/// Fraud-risk assessment for a single transaction.
///
/// The provider's `recommended_action` is trusted as-is; see
/// [`RiskVerdict::is_consistent`] for the conventional mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub risk_score: f64,
    pub risk_factors: Vec<String>,
    pub reasoning: String,
    pub recommended_action: RecommendedAction,
}

impl RiskVerdict {
    /// Type-checks a candidate JSON object and range-checks its values.
    pub fn from_value(value: Value) -> Result<Self, VerdictError> {
        let verdict: RiskVerdict = serde_json::from_value(value)?;
        verdict.validate()?;
        Ok(verdict)
    }

    pub fn validate(&self) -> Result<(), VerdictError> {
        if !(0.0..=1.0).contains(&self.risk_score) {
            return Err(VerdictError::ScoreOutOfRange(self.risk_score));
        }
        if self.reasoning.trim().is_empty() {
            return Err(VerdictError::EmptyReasoning);
        }
        Ok(())
    }

    pub fn expected_action(&self) -> RecommendedAction {
        RecommendedAction::for_score(self.risk_score)
    }

    pub fn is_consistent(&self) -> bool {
        self.expected_action() == self.recommended_action
    }
}
