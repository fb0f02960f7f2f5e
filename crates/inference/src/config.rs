use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::InferenceError;

/// Connection settings for the generative inference service.
///
/// # Example
/// ```
/// use inference::InferenceConfig;
///
/// let cfg = InferenceConfig {
///     api_key: Some("my-key".into()),
///     model: "gemini-1.5-pro".into(),
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InferenceConfig {
    /// Scheme + host of the service, without a trailing path.
    pub api_base: String,
    /// Model identifier inserted into `/v1beta/models/{model}:generateContent`.
    pub model: String,
    /// Sent as `x-goog-api-key`. Requests go out unauthenticated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-1.5-flash".into(),
            api_key: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl InferenceConfig {
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.api_base.trim().is_empty() {
            return Err(InferenceError::InvalidConfig(
                "api_base must not be empty".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(InferenceError::InvalidConfig(
                "model must not be empty".into(),
            ));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(InferenceError::InvalidConfig(
                "timeouts must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Full `generateContent` URL for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = InferenceConfig::default();
        assert_eq!(cfg.api_base, "https://generativelanguage.googleapis.com");
        assert_eq!(cfg.model, "gemini-1.5-flash");
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.connect_timeout_secs, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let cfg = InferenceConfig {
            api_base: "http://127.0.0.1:9000/".into(),
            model: "test-model".into(),
            ..Default::default()
        };
        assert_eq!(
            cfg.endpoint(),
            "http://127.0.0.1:9000/v1beta/models/test-model:generateContent"
        );
    }

    #[test]
    fn validate_rejects_empty_fields() {
        let cfg = InferenceConfig {
            model: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(InferenceError::InvalidConfig(_))
        ));

        let cfg = InferenceConfig {
            api_base: String::new(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let cfg = InferenceConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_partial_json_uses_defaults() {
        let cfg: InferenceConfig = serde_json::from_str(r#"{"model":"m"}"#).unwrap();
        assert_eq!(cfg.model, "m");
        assert_eq!(cfg.timeout_secs, 30);
    }
}
