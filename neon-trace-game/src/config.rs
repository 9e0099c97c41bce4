//! Engine tuning configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_STORAGE_KEY, HARD_DEADLINE_SECS, INTEGRITY_ALERT_THRESHOLD, INTEGRITY_MAX,
    STANDARD_DEADLINE_SECS, TIMEOUT_PENALTY, WRONG_ANSWER_PENALTY,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} deadline must be at least one second")]
    ZeroDeadline { field: &'static str },
    #[error("integrity alert threshold {0} exceeds {INTEGRITY_MAX}")]
    AlertThreshold(u8),
    #[error("storage key must not be empty")]
    EmptyStorageKey,
}

/// Tuning knobs for a mission session. Defaults match the shipped game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub standard_deadline_secs: u32,
    pub hard_deadline_secs: u32,
    pub wrong_answer_penalty: u8,
    pub timeout_penalty: u8,
    /// Integrity at or below this value is flagged for a visual alert.
    pub integrity_alert_threshold: u8,
    pub storage_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            standard_deadline_secs: STANDARD_DEADLINE_SECS,
            hard_deadline_secs: HARD_DEADLINE_SECS,
            wrong_answer_penalty: WRONG_ANSWER_PENALTY,
            timeout_penalty: TIMEOUT_PENALTY,
            integrity_alert_threshold: INTEGRITY_ALERT_THRESHOLD,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a configuration document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or the values fail [`EngineConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns an error for zero-length deadlines, an alert threshold above
    /// the integrity ceiling, or an empty storage key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.standard_deadline_secs == 0 {
            return Err(ConfigError::ZeroDeadline { field: "standard" });
        }
        if self.hard_deadline_secs == 0 {
            return Err(ConfigError::ZeroDeadline { field: "hard" });
        }
        if self.integrity_alert_threshold > INTEGRITY_MAX {
            return Err(ConfigError::AlertThreshold(self.integrity_alert_threshold));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(())
    }

    /// Deadline length for the given difficulty.
    #[must_use]
    pub const fn deadline_secs(&self, hard_mode: bool) -> u32 {
        if hard_mode {
            self.hard_deadline_secs
        } else {
            self.standard_deadline_secs
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_tuning() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.deadline_secs(false), 90);
        assert_eq!(cfg.deadline_secs(true), 55);
        assert_eq!(cfg.wrong_answer_penalty, 5);
        assert_eq!(cfg.timeout_penalty, 20);
        assert_eq!(cfg.storage_key, "neon-trace");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = EngineConfig::from_json(r#"{ "hard_deadline_secs": 30 }"#).unwrap();
        assert_eq!(cfg.hard_deadline_secs, 30);
        assert_eq!(cfg.standard_deadline_secs, 90);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "standard_deadline_secs": 0 }"#),
            Err(ConfigError::ZeroDeadline { field: "standard" })
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "integrity_alert_threshold": 101 }"#),
            Err(ConfigError::AlertThreshold(101))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "storage_key": "  " }"#),
            Err(ConfigError::EmptyStorageKey)
        ));
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
