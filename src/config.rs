//! Engine configuration
//!
//! Every struct deserializes from camelCase JSON with defaults filled in, and
//! can be overridden from `ELL_ADAPTER_*` environment variables (a `.env` file
//! is honored when present).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{AdaptError, Result};

const ENV_PREFIX: &str = "ELL_ADAPTER_";

/// Rolling-window caps for the generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub tokens_per_minute: u64,
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 50,
            tokens_per_minute: 40_000,
            window_ms: 60_000,
        }
    }
}

/// Per-call generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
    pub rate_limit: RateLimitConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.3,
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_ms: 60_000,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Top-level engine options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub max_retries: u32,
    pub quality_threshold: f64,
    pub timeout_ms: u64,
    pub enable_validation: bool,
    pub enable_quality_check: bool,
    pub client: ClientConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            quality_threshold: 0.8,
            timeout_ms: 60_000,
            enable_validation: true,
            enable_quality_check: true,
            client: ClientConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file; absent keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AdaptError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| AdaptError::Config(format!("Invalid config {}: {}", path.display(), e)))
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_parse("MAX_RETRIES")? {
            self.max_retries = v;
        }
        if let Some(v) = env_parse("QUALITY_THRESHOLD")? {
            self.quality_threshold = v;
        }
        if let Some(v) = env_parse("TIMEOUT_MS")? {
            self.timeout_ms = v;
        }
        if let Some(v) = env_parse("ENABLE_VALIDATION")? {
            self.enable_validation = v;
        }
        if let Some(v) = env_parse("ENABLE_QUALITY_CHECK")? {
            self.enable_quality_check = v;
        }
        if let Some(v) = env_parse("MAX_TOKENS")? {
            self.client.max_tokens = v;
        }
        if let Some(v) = env_parse("TEMPERATURE")? {
            self.client.temperature = v;
        }
        if let Some(v) = env_parse("RETRY_DELAY_MS")? {
            self.client.retry_delay_ms = v;
        }
        if let Some(v) = env_parse("REQUESTS_PER_MINUTE")? {
            self.client.rate_limit.requests_per_minute = v;
        }
        if let Some(v) = env_parse("TOKENS_PER_MINUTE")? {
            self.client.rate_limit.tokens_per_minute = v;
        }
        Ok(())
    }

    /// Client settings with the engine-level retry and timeout applied
    pub fn effective_client(&self) -> ClientConfig {
        ClientConfig {
            max_retries: self.max_retries,
            timeout_ms: self.timeout_ms,
            ..self.client.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            return Err(AdaptError::Config(format!(
                "qualityThreshold must be within [0, 1], got {}",
                self.quality_threshold
            )));
        }
        if self.client.rate_limit.requests_per_minute == 0 {
            return Err(AdaptError::Config("requestsPerMinute must be positive".into()));
        }
        if self.client.rate_limit.window_ms == 0 {
            return Err(AdaptError::Config("windowMs must be positive".into()));
        }
        Ok(())
    }
}

/// Connection settings for the HTTP generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3001/api/claude".to_string(),
            api_key: None,
            model: None,
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var(format!("{}ENDPOINT", ENV_PREFIX)) {
            config.endpoint = endpoint;
        }
        config.api_key = std::env::var(format!("{}API_KEY", ENV_PREFIX))
            .ok()
            .filter(|k| !k.is_empty());
        config.model = std::env::var(format!("{}MODEL", ENV_PREFIX))
            .ok()
            .filter(|m| !m.is_empty());
        config
    }
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>> {
    let key = format!("{}{}", ENV_PREFIX, name);
    match std::env::var(&key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AdaptError::invalid_input(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(None),
    }
}
