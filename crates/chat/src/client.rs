use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info};

use crate::{ChatConfig, ChatError, TokenSigner};

/// Server-side client for the support channel.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    cfg: ChatConfig,
    signer: TokenSigner,
}

impl ChatClient {
    pub fn new(cfg: &ChatConfig) -> Result<Self, ChatError> {
        cfg.validate()?;
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| ChatError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            http,
            signer: TokenSigner::new(&cfg.api_secret)?,
            cfg: cfg.clone(),
        })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.cfg
    }

    pub fn user_token(&self, user_id: &str) -> Result<String, ChatError> {
        self.signer.user_token(user_id)
    }

    /// Create or update a user record.
    pub async fn upsert_user(&self, user_id: &str, name: &str) -> Result<(), ChatError> {
        if user_id.trim().is_empty() {
            return Err(ChatError::EmptyUserId);
        }
        let url = format!("{}/users", self.cfg.base_url.trim_end_matches('/'));
        let body = json!({ "users": { user_id: { "id": user_id, "name": name } } });
        self.post(&url, &body).await?;
        Ok(())
    }

    /// Get-or-create the support channel, created by the admin user with `member` in it.
    pub async fn ensure_support_channel(&self, member: &str) -> Result<(), ChatError> {
        let url = format!("{}/query", self.cfg.channel_url());
        let body = json!({
            "data": {
                "name": self.cfg.channel_name,
                "members": [member],
                "created_by_id": self.cfg.admin_user_id,
            }
        });
        self.post(&url, &body).await?;
        Ok(())
    }

    /// Adding an existing member again is accepted by the service.
    pub async fn add_member(&self, user_id: &str) -> Result<(), ChatError> {
        if user_id.trim().is_empty() {
            return Err(ChatError::EmptyUserId);
        }
        let body = json!({ "add_members": [user_id] });
        self.post(&self.cfg.channel_url(), &body).await?;
        Ok(())
    }

    /// Remove every message from the support channel.
    pub async fn truncate_support_channel(&self) -> Result<(), ChatError> {
        let url = format!("{}/truncate", self.cfg.channel_url());
        self.post(&url, &json!({})).await?;
        info!(channel = %self.cfg.channel_id, "chat_channel_truncated");
        Ok(())
    }

    /// Upsert the user, make sure they are in the support channel, and hand back their token.
    pub async fn provision_member(&self, user_id: &str, name: &str) -> Result<String, ChatError> {
        let start = Instant::now();
        self.upsert_user(user_id, name).await?;
        self.ensure_support_channel(user_id).await?;
        self.add_member(user_id).await?;
        let token = self.signer.user_token(user_id)?;
        info!(
            user_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "chat_member_provisioned"
        );
        Ok(token)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, ChatError> {
        let start = Instant::now();
        let response = self
            .http
            .post(url)
            .query(&[("api_key", self.cfg.api_key.as_str())])
            .header("Authorization", self.signer.server_token()?)
            .header("stream-auth-type", "jwt")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;
        debug!(
            url,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "chat_response"
        );
        Ok(value)
    }
}
