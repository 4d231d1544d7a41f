//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::aggregate::{
    AggregatorConfig, DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_SET_PREFIX, RANKED_QUEUE_ID,
};
use crate::fetch::{FetchError, RiotClientConfig};
use crate::parse_duration;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Riot API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiotConfig {
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Platform host (league endpoints)
    #[serde(default = "default_platform_url")]
    pub platform_url: String,

    /// Regional host (account and match endpoints)
    #[serde(default = "default_regional_url")]
    pub regional_url: String,

    /// Region label shown in reports
    #[serde(default = "default_region")]
    pub region: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Match fetches in flight at once
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_api_key_env() -> String {
    "RIOT_API_KEY".to_string()
}

fn default_platform_url() -> String {
    "https://euw1.api.riotgames.com".to_string()
}

fn default_regional_url() -> String {
    "https://europe.api.riotgames.com".to_string()
}

fn default_region() -> String {
    "euw1".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            platform_url: default_platform_url(),
            regional_url: default_regional_url(),
            region: default_region(),
            timeout_seconds: default_timeout(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl RiotConfig {
    /// Build the client configuration, reading the key from the environment.
    pub fn client_config(&self) -> Result<RiotClientConfig, FetchError> {
        let api_key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| FetchError::MissingApiKey(self.api_key_env.clone()))?;

        Ok(RiotClientConfig {
            api_key: api_key.trim().to_string(),
            platform_url: Url::parse(&self.platform_url)
                .map_err(|_| FetchError::InvalidUrl(self.platform_url.clone()))?,
            regional_url: Url::parse(&self.regional_url)
                .map_err(|_| FetchError::InvalidUrl(self.regional_url.clone()))?,
            region: self.region.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            ..RiotClientConfig::default()
        })
    }
}

/// Match aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Recent matches considered per aggregation
    #[serde(default = "default_lookback_count")]
    pub lookback_count: u32,

    #[serde(default = "default_ranked_queue_id")]
    pub ranked_queue_id: u32,

    /// Trait prefix of the current set; empty disables the filter
    #[serde(default = "default_set_prefix")]
    pub set_prefix: String,

    /// Games a composition needs before it can be called best or worst
    #[serde(default = "default_min_sample")]
    pub min_sample: u32,

    /// Matches shown by the history command
    #[serde(default = "default_history_count")]
    pub history_count: u32,
}

fn default_lookback_count() -> u32 {
    20
}

fn default_ranked_queue_id() -> u32 {
    RANKED_QUEUE_ID
}

fn default_set_prefix() -> String {
    DEFAULT_SET_PREFIX.to_string()
}

fn default_min_sample() -> u32 {
    3
}

fn default_history_count() -> u32 {
    5
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            lookback_count: default_lookback_count(),
            ranked_queue_id: default_ranked_queue_id(),
            set_prefix: default_set_prefix(),
            min_sample: default_min_sample(),
            history_count: default_history_count(),
        }
    }
}

/// Aggregate cache configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum age of a cached aggregate (e.g. "6h"). Unset: never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<String>,
}

impl CacheConfig {
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age.as_deref().and_then(parse_duration)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub riot: RiotConfig,

    #[serde(default)]
    pub aggregation: AggregationConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            riot: RiotConfig::default(),
            aggregation: AggregationConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.riot.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Riot timeout must be greater than 0".to_string(),
            ));
        }

        if self.riot.max_concurrent_fetches == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent_fetches must be greater than 0".to_string(),
            ));
        }

        if self.aggregation.lookback_count == 0 {
            return Err(ConfigError::ValidationError(
                "lookback_count must be greater than 0".to_string(),
            ));
        }

        if let Some(max_age) = &self.cache.max_age {
            if parse_duration(max_age).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "cache.max_age is not a duration: {}",
                    max_age
                )));
            }
        }

        Ok(())
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            ranked_queue_id: self.aggregation.ranked_queue_id,
            set_prefix: self.aggregation.set_prefix.clone(),
            max_concurrent_fetches: self.riot.max_concurrent_fetches,
        }
    }
}
