//! Configuration for placegate.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::PlacegateResult;

/// Environment variable consulted when `upstream.api_key` is empty.
pub const API_KEY_ENV: &str = "PLACEGATE_API_KEY";

/// Main configuration for placegate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Bounds cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Rate limiter settings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Persistent storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Upstream places API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Bounds cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached boxes.
    #[serde(default = "default_cache_max_size")]
    pub max_size: usize,

    /// Entry time to live in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,

    /// Margin added on each side of a stored box, as a fraction of its span.
    #[serde(default = "default_expansion_factor")]
    pub expansion_factor: f64,

    /// Key under which the cache blob is persisted.
    #[serde(default = "default_cache_storage_key")]
    pub storage_key: String,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_cache_max_size(),
            ttl_ms: default_cache_ttl_ms(),
            expansion_factor: default_expansion_factor(),
            storage_key: default_cache_storage_key(),
        }
    }
}

fn default_cache_max_size() -> usize {
    10
}

fn default_cache_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_expansion_factor() -> f64 {
    0.5
}

fn default_cache_storage_key() -> String {
    "placegate_apiCache".to_string()
}

/// Sliding window rate limiter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Window length in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Key under which limiter state is persisted.
    #[serde(default = "default_limit_storage_key")]
    pub storage_key: String,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
            storage_key: default_limit_storage_key(),
        }
    }
}

fn default_max_requests() -> usize {
    15
}

fn default_window_ms() -> u64 {
    60 * 60 * 1000
}

fn default_limit_storage_key() -> String {
    "apiRateLimit".to_string()
}

/// Persistent storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".placegate/placegate.db")
}

/// Upstream places API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the places API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value sent as `x-rapidapi-host`.
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// API key. Falls back to `PLACEGATE_API_KEY` when empty.
    #[serde(default)]
    pub api_key: String,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// Returns the configured key or the one from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    /// Returns the configured key, else `fallback` when it is not blank.
    pub fn resolve_api_key(&self, fallback: Option<String>) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.clone());
        }
        fallback.filter(|k| !k.trim().is_empty())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_host: default_api_host(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://travel-advisor.p.rapidapi.com".to_string()
}

fn default_api_host() -> String {
    "travel-advisor.p.rapidapi.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> PlacegateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PlacegateResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            storage: StorageConfig::default(),
            upstream: UpstreamConfig::default(),
        }
    }

    /// Tries to load configuration from current directory or uses default.
    pub fn load_or_default() -> Self {
        Self::load("placegate.toml").unwrap_or_else(|_| Self::default_config())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache.max_size, 10);
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.expansion_factor, 0.5);
        assert_eq!(config.rate_limit.max_requests, 15);
        assert_eq!(config.rate_limit.window(), Duration::from_secs(3600));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [cache]
            max_size = 3

            [rate_limit]
            window_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.max_size, 3);
        assert_eq!(config.cache.ttl_ms, 300_000);
        assert_eq!(config.rate_limit.window_ms, 1500);
        assert_eq!(config.rate_limit.window(), Duration::from_millis(1500));
        assert_eq!(config.rate_limit.max_requests, 15);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("placegate.toml");

        let mut config = Config::default();
        config.cache.max_size = 42;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.cache.max_size, 42);
    }

    #[test]
    fn test_configured_api_key_wins() {
        let upstream = UpstreamConfig {
            api_key: "abc".to_string(),
            ..UpstreamConfig::default()
        };
        assert_eq!(upstream.resolved_api_key().as_deref(), Some("abc"));
    }

    #[test]
    fn test_blank_api_key_falls_back() {
        let upstream = UpstreamConfig {
            api_key: "  ".to_string(),
            ..UpstreamConfig::default()
        };
        assert_eq!(upstream.resolve_api_key(None), None);
        assert_eq!(upstream.resolve_api_key(Some(" ".to_string())), None);
        assert_eq!(
            upstream.resolve_api_key(Some("from-env".to_string())).as_deref(),
            Some("from-env")
        );

        let configured = UpstreamConfig {
            api_key: "abc".to_string(),
            ..UpstreamConfig::default()
        };
        assert_eq!(
            configured.resolve_api_key(Some("from-env".to_string())).as_deref(),
            Some("abc")
        );
    }
}
