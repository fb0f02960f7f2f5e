use astra::{AstraConfig, PipelineConfig};
use chat::ChatConfig;
use leaders::SearchConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

pub const STREAM_API_KEY_ENV: &str = "STREAM_API_KEY";
pub const STREAM_API_SECRET_ENV: &str = "STREAM_API_SECRET";
pub const SEARCH_API_KEY_ENV: &str = "SEARCH_API_KEY";
pub const SEARCH_ENGINE_ID_ENV: &str = "SEARCH_ENGINE_ID";

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds. Must outlast the three pipeline stage deadlines.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Rate limit: requests per minute per admin API key
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// Keys accepted on admin routes. Empty means admin routes are closed.
    #[serde(default)]
    pub api_keys: HashSet<String>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Install the Prometheus recorder and serve `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Optional pipeline YAML file; replaces the `pipeline` section when set.
    #[serde(default)]
    pub pipeline_file: Option<String>,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            api_keys: HashSet::new(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            pipeline_file: None,
            pipeline: PipelineConfig::default(),
            chat: ChatConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `astra-server` file and `ASTRA_*` variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("astra-server").required(false))
            .add_source(
                config::Environment::with_prefix("ASTRA")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("api_keys")
                    .try_parsing(true),
            );

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;

        if let Some(path) = config.pipeline_file.as_deref() {
            config.pipeline = AstraConfig::from_file(path)?.pipeline;
        }
        config.apply_env_defaults();

        Ok(config)
    }

    /// Fill unset credentials from their conventional environment variables.
    pub fn apply_env_defaults(&mut self) {
        self.pipeline.apply_env_defaults();
        fill_from_env(&mut self.chat.api_key, STREAM_API_KEY_ENV);
        fill_from_env(&mut self.chat.api_secret, STREAM_API_SECRET_ENV);
        fill_from_env(&mut self.search.api_key, SEARCH_API_KEY_ENV);
        fill_from_env(&mut self.search.engine_id, SEARCH_ENGINE_ID_ENV);
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn fill_from_env(slot: &mut String, var: &str) {
    if !slot.trim().is_empty() {
        return;
    }
    if let Ok(value) = std::env::var(var) {
        if !value.trim().is_empty() {
            *slot = value;
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_body_size_mb() -> usize {
    1
}

fn default_rate_limit_per_minute() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
