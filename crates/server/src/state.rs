use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use astra::Pipeline;
use chat::ChatClient;
use dashmap::DashMap;
use leaders::LeaderSearch;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::{Duration, Instant};
use subtle::{Choice, ConstantTimeEq};

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, Instant)>>,

    /// Triage pipeline (shared across requests)
    pub pipeline: Arc<Pipeline>,

    /// Present only when chat credentials are configured
    pub chat: Option<Arc<ChatClient>>,

    /// Present only when search credentials are configured
    pub leaders: Option<Arc<LeaderSearch>>,

    /// Renders `/metrics`; absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,

    /// Set once at startup; `/health` and `/ready` report uptime from here
    pub started_at: Instant,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline = Pipeline::from_config(&config.pipeline)
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let chat = if config.chat.is_configured() {
            let client = ChatClient::new(&config.chat).map_err(|e| ServerError::Config(e.to_string()))?;
            Some(Arc::new(client))
        } else {
            None
        };

        let leaders = if config.search.is_configured() {
            let search =
                LeaderSearch::new(&config.search).map_err(|e| ServerError::Config(e.to_string()))?;
            Some(Arc::new(search))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            pipeline: Arc::new(pipeline),
            chat,
            leaders,
            metrics: None,
            started_at: Instant::now(),
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Check if API key is valid. Every configured key is compared, in constant time.
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        let provided = key.as_bytes();
        let mut matched = Choice::from(0u8);
        for candidate in &self.config.api_keys {
            matched |= candidate.as_bytes().ct_eq(provided);
        }
        matched.into()
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = Instant::now();
        let window = Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_keys(keys: &[&str], limit: u32) -> ServerState {
        let config = ServerConfig {
            api_keys: keys.iter().map(|k| k.to_string()).collect(),
            rate_limit_per_minute: limit,
            ..Default::default()
        };
        ServerState::new(config).unwrap()
    }

    #[test]
    fn api_key_must_match_exactly() {
        let state = state_with_keys(&["admin-key", "other-key"], 10);
        assert!(state.is_valid_api_key("admin-key"));
        assert!(state.is_valid_api_key("other-key"));
        assert!(!state.is_valid_api_key("admin-ke"));
        assert!(!state.is_valid_api_key("admin-key "));
        assert!(!state.is_valid_api_key(""));
    }

    #[test]
    fn no_keys_accepts_nothing() {
        let state = state_with_keys(&[], 10);
        assert!(!state.is_valid_api_key(""));
        assert!(!state.is_valid_api_key("anything"));
    }

    #[test]
    fn rate_limit_is_per_key() {
        let state = state_with_keys(&["a", "b"], 2);
        assert!(state.check_rate_limit("a"));
        assert!(state.check_rate_limit("a"));
        assert!(!state.check_rate_limit("a"));
        assert!(state.check_rate_limit("b"));
    }

    #[test]
    fn uptime_counts_from_construction() {
        let state = state_with_keys(&[], 10);
        std::thread::sleep(Duration::from_millis(20));
        assert!(state.uptime() >= Duration::from_millis(20));

        let clone = state.clone();
        assert_eq!(clone.started_at, state.started_at);
    }

    #[test]
    fn collaborators_absent_without_credentials() {
        let state = state_with_keys(&[], 10);
        assert!(state.chat.is_none());
        assert!(state.leaders.is_none());
        assert!(state.metrics.is_none());
    }
}
