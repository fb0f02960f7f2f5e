//! Who represents this place?
//!
//! [`LeaderSearch`] runs one web search for the elected leaders of a
//! location and returns the raw hits. It does not try to extract names;
//! the app shows titles, links and snippets as they come.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

const MAX_RESULTS_CAP: u8 = 10;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LeaderError {
    #[error("invalid search config: {0}")]
    InvalidConfig(String),
    #[error("location must not be empty")]
    EmptyLocation,
    #[error("search request failed: {0}")]
    Http(String),
    #[error("search service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid search response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LeaderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LeaderError::Decode(err.to_string())
        } else {
            LeaderError::Http(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: String,
    /// Programmable search engine id (`cx`).
    pub engine_id: String,
    /// Hits per lookup; the service caps this at 10.
    pub max_results: u8,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/customsearch/v1".into(),
            api_key: String::new(),
            engine_id: String::new(),
            max_results: 5,
            timeout_secs: 15,
        }
    }
}

impl SearchConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.engine_id.trim().is_empty()
    }

    pub fn validate(&self) -> Result<(), LeaderError> {
        if !self.is_configured() {
            return Err(LeaderError::InvalidConfig(
                "api_key and engine_id are required".into(),
            ));
        }
        if self.endpoint.trim().is_empty() {
            return Err(LeaderError::InvalidConfig("endpoint must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(LeaderError::InvalidConfig(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// `max_results` clamped to what the service accepts.
    pub fn result_count(&self) -> u8 {
        self.max_results.clamp(1, MAX_RESULTS_CAP)
    }
}

/// One search result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LeaderHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    // The API sends `"items": null` as well as omitting the key.
    items: Option<Vec<LeaderHit>>,
}

/// Query text sent for `location`.
pub fn leader_query(location: &str) -> String {
    format!("current elected political leaders of {}", location.trim())
}

#[derive(Debug, Clone)]
pub struct LeaderSearch {
    http: reqwest::Client,
    cfg: SearchConfig,
}

impl LeaderSearch {
    pub fn new(cfg: &SearchConfig) -> Result<Self, LeaderError> {
        cfg.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| LeaderError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            http,
            cfg: cfg.clone(),
        })
    }

    /// Search once. A response without `items` is an empty list, not an error.
    pub async fn lookup(&self, location: &str) -> Result<Vec<LeaderHit>, LeaderError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LeaderError::EmptyLocation);
        }

        let start = Instant::now();
        let num = self.cfg.result_count().to_string();
        let query = leader_query(location);
        let response = self
            .http
            .get(&self.cfg.endpoint)
            .query(&[
                ("key", self.cfg.api_key.as_str()),
                ("cx", self.cfg.engine_id.as_str()),
                ("q", query.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(location, status = status.as_u16(), "leader_lookup_failure");
            return Err(LeaderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| LeaderError::Decode(e.to_string()))?;
        let items = parsed.items.unwrap_or_default();
        debug!(
            location,
            hits = items.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "leader_lookup_success"
        );
        Ok(items)
    }
}
