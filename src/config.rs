//! Configuration Module
//!
//! Handles loading and validating client configuration from environment variables.

use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::{ClientError, Result};

/// Public PokeAPI v2 root
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// API root, without a trailing slash
    pub base_url: String,
    /// Per-request network timeout
    pub request_timeout: Duration,
    /// Lifetime of cached responses
    pub cache_ttl: Duration,
    /// Interval between background sweeps; defaults to the TTL
    pub reap_interval: Option<Duration>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unset variables fall back to their defaults; a variable that is set
    /// but not a whole number of seconds is a `ClientError::Config`.
    ///
    /// # Environment Variables
    /// - `POKEAPI_BASE_URL` - API root (default: https://pokeapi.co/api/v2)
    /// - `REQUEST_TIMEOUT` - Request timeout in seconds (default: 5)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 300)
    /// - `REAP_INTERVAL` - Reaper interval in seconds (default: the TTL)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            base_url: env::var("POKEAPI_BASE_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            request_timeout: secs_var("REQUEST_TIMEOUT")?.unwrap_or(defaults.request_timeout),
            cache_ttl: secs_var("CACHE_TTL")?.unwrap_or(defaults.cache_ttl),
            reap_interval: secs_var("REAP_INTERVAL")?,
        })
    }

    /// Checks that every duration is non-zero and the base URL is set.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::Config("base URL must not be empty".to_string()));
        }
        if Url::parse(&self.base_url).map_or(true, |url| url.cannot_be_a_base()) {
            return Err(ClientError::Config(format!(
                "base URL is not a valid URL: {}",
                self.base_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ClientError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if self.cache_ttl.is_zero() {
            return Err(ClientError::Config(
                "cache TTL must be greater than zero".to_string(),
            ));
        }
        if self.reap_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(ClientError::Config(
                "reap interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective reaper interval.
    pub fn reap_interval(&self) -> Duration {
        self.reap_interval.unwrap_or(self.cache_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(5 * 60),
            reap_interval: None,
        }
    }
}

fn secs_var(name: &str) -> Result<Option<Duration>> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };

    raw.trim()
        .parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|_| {
            ClientError::Config(format!(
                "{} must be a whole number of seconds, got {:?}",
                name, raw
            ))
        })
}
