use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::TriageError;

/// How the fallback policy treats the free-form `type` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypePolicy {
    /// Complete reports pass through untouched, whatever the model wrote in `type`.
    #[default]
    Passthrough,
    /// `type` must name a real emergency label; anything else (including SPAM)
    /// collapses to the sentinel, and recognized labels get their canonical spelling.
    Strict,
}

/// Per-stage deadlines and limits for one triage run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TriageConfig {
    pub fetch_timeout_ms: u64,
    pub describe_timeout_ms: u64,
    pub classify_timeout_ms: u64,
    /// Reject images larger than this many bytes. `None` disables the check.
    pub max_image_bytes: Option<u64>,
    pub type_policy: TypePolicy,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            describe_timeout_ms: 20_000,
            classify_timeout_ms: 20_000,
            max_image_bytes: Some(20 * 1024 * 1024),
            type_policy: TypePolicy::Passthrough,
        }
    }
}

impl TriageConfig {
    pub fn validate(&self) -> Result<(), TriageError> {
        if self.fetch_timeout_ms == 0
            || self.describe_timeout_ms == 0
            || self.classify_timeout_ms == 0
        {
            return Err(TriageError::InvalidConfig(
                "stage deadlines must be greater than zero".into(),
            ));
        }
        if self.max_image_bytes == Some(0) {
            return Err(TriageError::InvalidConfig(
                "max_image_bytes must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }

    pub fn fetch_deadline(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn describe_deadline(&self) -> Duration {
        Duration::from_millis(self.describe_timeout_ms)
    }

    pub fn classify_deadline(&self) -> Duration {
        Duration::from_millis(self.classify_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = TriageConfig::default();
        assert_eq!(cfg.fetch_timeout_ms, 10_000);
        assert_eq!(cfg.describe_timeout_ms, 20_000);
        assert_eq!(cfg.classify_timeout_ms, 20_000);
        assert_eq!(cfg.max_image_bytes, Some(20 * 1024 * 1024));
        assert_eq!(cfg.type_policy, TypePolicy::Passthrough);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deadlines_convert_to_durations() {
        let cfg = TriageConfig {
            fetch_timeout_ms: 1500,
            ..Default::default()
        };
        assert_eq!(cfg.fetch_deadline(), Duration::from_millis(1500));
        assert_eq!(cfg.describe_deadline(), Duration::from_secs(20));
    }

    #[test]
    fn validate_rejects_zero_deadline() {
        let cfg = TriageConfig {
            classify_timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(TriageError::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_zero_size_limit() {
        let cfg = TriageConfig {
            max_image_bytes: Some(0),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let unlimited = TriageConfig {
            max_image_bytes: None,
            ..Default::default()
        };
        assert!(unlimited.validate().is_ok());
    }

    #[test]
    fn type_policy_serde_snake_case() {
        let cfg: TriageConfig = serde_json::from_str(r#"{"type_policy":"strict"}"#).unwrap();
        assert_eq!(cfg.type_policy, TypePolicy::Strict);
        assert_eq!(cfg.fetch_timeout_ms, 10_000);
    }
}
