use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ChatError;

/// Credentials and channel coordinates for the support chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChatConfig {
    /// Public API key, sent as the `api_key` query parameter.
    pub api_key: String,
    /// Signing secret for user and server tokens. Never leaves the process.
    #[serde(skip_serializing)]
    pub api_secret: String,
    pub base_url: String,
    pub channel_type: String,
    pub channel_id: String,
    /// Display name given to the channel when it is first created.
    pub channel_name: String,
    /// User recorded as the channel creator.
    pub admin_user_id: String,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: "https://chat.stream-io-api.com".into(),
            channel_type: "messaging".into(),
            channel_id: "astra-support".into(),
            channel_name: "Astra Support".into(),
            admin_user_id: "admin".into(),
            timeout_secs: 15,
        }
    }
}

impl ChatConfig {
    /// True when both credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_secret.trim().is_empty()
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if !self.is_configured() {
            return Err(ChatError::InvalidConfig(
                "api_key and api_secret are required".into(),
            ));
        }
        let required = [
            ("base_url", &self.base_url),
            ("channel_type", &self.channel_type),
            ("channel_id", &self.channel_id),
            ("admin_user_id", &self.admin_user_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ChatError::InvalidConfig(format!("{name} must not be empty")));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ChatError::InvalidConfig(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `{base_url}/channels/{type}/{id}` with any trailing slash on the base removed.
    pub fn channel_url(&self) -> String {
        format!(
            "{}/channels/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.channel_type,
            self.channel_id
        )
    }
}
