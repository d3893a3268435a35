//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WORK24_*, plus the unprefixed REDIS_URL)
//! 2. TOML config file (if WORK24_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheScope;

mod validation;

pub use validation::ConfigError;

/// Default upstream endpoint for the Work24 small-giant listing.
pub const DEFAULT_BASE_URL: &str = "https://www.work24.go.kr/cm/openApi/call/wk/callOpenApiSvcInfo216L01.do";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables prefixed with `WORK24_`
/// 2. `REDIS_URL` environment variable
/// 3. TOML config file (if WORK24_CONFIG_FILE set)
/// 4. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Work24 API auth key passed through to the upstream.
    ///
    /// Set via WORK24_AUTH_KEY environment variable.
    /// Required only when a fetch is performed.
    #[serde(default)]
    pub auth_key: Option<String>,

    /// Cache time-to-live in seconds. Zero or negative disables caching.
    ///
    /// Set via WORK24_CACHE_TTL_SECONDS environment variable.
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: i64,

    /// Redis connection URL for the external cache backend.
    ///
    /// Set via REDIS_URL or WORK24_REDIS_URL environment variable.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Which parameters make up the cache signature.
    ///
    /// Set via WORK24_CACHE_SCOPE environment variable (`fetch` or `query`).
    #[serde(default)]
    pub cache_scope: CacheScope,

    /// Upstream endpoint.
    ///
    /// Set via WORK24_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string for upstream requests.
    ///
    /// Set via WORK24_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-page request timeout in milliseconds.
    ///
    /// Set via WORK24_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes accepted per page response.
    ///
    /// Set via WORK24_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Listen address for the HTTP service.
    ///
    /// Set via WORK24_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_cache_ttl_seconds() -> i64 {
    300
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_user_agent() -> String {
    "smallcaps/1.0".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth_key: None,
            cache_ttl_seconds: default_cache_ttl_seconds(),
            redis_url: None,
            cache_scope: CacheScope::default(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache TTL, or `None` when caching is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        u64::try_from(self.cache_ttl_seconds)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Redis URL, ignoring blank values.
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }

    /// Build the layered figment without extracting it.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WORK24_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment
            .merge(
                Env::raw()
                    .only(&["REDIS_URL"])
                    .map(|key| key.as_str().to_lowercase().into()),
            )
            .merge(
                Env::prefixed("WORK24_")
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            )
    }

    /// Extract and validate configuration from a figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if extraction fails and
    /// `ConfigError::Invalid` if validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Return the auth key, failing when it is absent or blank.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the auth key is not set.
    pub fn require_auth_key(&self) -> Result<&str, ConfigError> {
        self.auth_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "auth_key".into(),
                hint: "Set WORK24_AUTH_KEY environment variable".into(),
            })
    }
}
