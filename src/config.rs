//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted ad store; `None` selects the in-memory store
    pub store_url: Option<String>,
    /// API key sent to the hosted ad store
    pub store_key: Option<String>,
    /// How long a fetched ad set is served before refreshing, in seconds
    pub cache_ttl: u64,
    /// Debounce delay for impression batches, in milliseconds
    pub impression_debounce_ms: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `AD_STORE_URL` - Hosted ad store base URL (default: unset, in-memory store)
    /// - `AD_STORE_KEY` - Hosted ad store API key (default: unset)
    /// - `CACHE_TTL` - Ad cache TTL in seconds (default: 300)
    /// - `IMPRESSION_DEBOUNCE_MS` - Impression debounce delay (default: 2000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store_url: env::var("AD_STORE_URL").ok().filter(|v| !v.is_empty()),
            store_key: env::var("AD_STORE_KEY").ok().filter(|v| !v.is_empty()),
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl),
            impression_debounce_ms: env::var("IMPRESSION_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.impression_debounce_ms),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Impression debounce delay as a Duration.
    pub fn impression_debounce(&self) -> Duration {
        Duration::from_millis(self.impression_debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            store_key: None,
            cache_ttl: 300,
            impression_debounce_ms: 2000,
            server_port: 3000,
        }
    }
}
