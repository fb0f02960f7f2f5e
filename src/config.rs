//! YAML configuration file support for the triage pipeline.
//!
//! ## Example YAML configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "astra-production"
//!
//! inference:
//!   api_base: "https://generativelanguage.googleapis.com"
//!   model: "gemini-1.5-flash"
//!   timeout_secs: 30
//!   connect_timeout_secs: 10
//!
//! triage:
//!   fetch_timeout_ms: 10000
//!   describe_timeout_ms: 20000
//!   classify_timeout_ms: 20000
//!   max_image_bytes: 20971520
//!   type_policy: passthrough   # or: strict
//! ```
//!
//! The API key is deliberately absent: leave it out of the file and export
//! `GEMINI_API_KEY` instead (see [`PipelineConfig::apply_env_defaults`]).

use std::fs;
use std::path::Path;

use inference::InferenceConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use triage::TriageConfig;

/// Environment variable consulted when no inference key is configured.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const SUPPORTED_VERSIONS: &[&str] = &["1", "1.0"];

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Everything a [`Pipeline`](crate::Pipeline) needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub inference: InferenceConfig,
    pub triage: TriageConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.inference
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.triage
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        Ok(())
    }

    /// Fill the inference key from `GEMINI_API_KEY` when none is configured.
    pub fn apply_env_defaults(&mut self) {
        if self.inference.api_key.is_none() {
            self.inference.api_key = std::env::var(GEMINI_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
    }
}

/// Top-level YAML document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AstraConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(flatten)]
    pub pipeline: PipelineConfig,
}

impl AstraConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: AstraConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if !SUPPORTED_VERSIONS.contains(&self.version.trim()) {
            return Err(ConfigLoadError::UnsupportedVersion(self.version.clone()));
        }
        self.pipeline.validate()
    }
}

impl Default for AstraConfig {
    fn default() -> Self {
        Self {
            version: "1.0".into(),
            name: None,
            pipeline: PipelineConfig::default(),
        }
    }
}
