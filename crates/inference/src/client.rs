use async_trait::async_trait;
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

use crate::{GenerateContentRequest, InferenceConfig, InferenceError};

/// Anything that can answer a `generateContent` request.
///
/// The triage stages only see this trait, so tests can swap in canned
/// responses and deployments can point at another provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one request and return the raw JSON response. One attempt, no retry.
    async fn generate(&self, request: &GenerateContentRequest) -> Result<Value, InferenceError>;
}

/// HTTP client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(cfg: &InferenceConfig) -> Result<Self, InferenceError> {
        cfg.validate()?;
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .connect_timeout(cfg.connect_timeout())
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| InferenceError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint(),
            api_key: cfg.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<Value, InferenceError> {
        let start = Instant::now();
        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(key) = self.api_key.as_deref() {
            builder = builder.header("x-goog-api-key", key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;
        debug!(
            endpoint = %self.endpoint,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "inference_response"
        );
        Ok(value)
    }
}
