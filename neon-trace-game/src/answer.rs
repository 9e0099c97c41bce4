//! Answer normalization and verdicts.
use serde::{Deserialize, Serialize};

use crate::data::Mission;

/// Trim surrounding whitespace and lowercase. Idempotent.
#[must_use]
pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Result of checking a raw submission against a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "answer", rename_all = "lowercase")]
pub enum AnswerVerdict {
    /// Nothing left after normalization.
    Empty,
    Accepted(String),
    Rejected(String),
}

impl AnswerVerdict {
    #[must_use]
    pub fn evaluate(mission: &Mission, raw: &str) -> Self {
        let normalized = normalize_answer(raw);
        if normalized.is_empty() {
            Self::Empty
        } else if mission.accepts(&normalized) {
            Self::Accepted(normalized)
        } else {
            Self::Rejected(normalized)
        }
    }

    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}
