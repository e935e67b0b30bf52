//! Scraper configuration
//!
//! Settings are read from a TOML file. Without an explicit path the file is
//! looked up in the platform's configuration directory; a missing file there
//! simply yields the defaults. The API key can be supplied through the
//! `TVDB_API_KEY` environment variable instead of the file.

use crate::xml_document::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the configured API key
pub const API_KEY_ENV: &str = "TVDB_API_KEY";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine the configuration directory location
    #[error("Failed to determine configuration directory location")]
    ConfigDirectoryNotFound,

    /// Failed to read the configuration file
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has wrong field types
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Request budget towards TheTVDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window_secs: 10,
        }
    }
}

/// Retry settings of the XML page fetcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Delay unit; attempt `n` waits `n * base_delay_ms`
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

/// All scraper settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub api_key: String,
    /// Default ISO-639-1 language for lookups
    pub language: String,
    pub api_base_url: String,
    /// Prefix for the relative image paths the API returns
    pub artwork_base_url: String,
    pub request_timeout_secs: u64,
    pub rate_limit: RateLimitConfig,
    pub retry: RetryConfig,
    /// Lifetime of cached XML pages; 0 disables the page cache
    pub page_cache_ttl_hours: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: "en".to_string(),
            api_base_url: "https://api.thetvdb.com".to_string(),
            artwork_base_url: "https://thetvdb.com/banners/".to_string(),
            request_timeout_secs: 30,
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            page_cache_ttl_hours: 24,
        }
    }
}

impl ScraperConfig {
    /// Loads the configuration and applies environment overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Explicit config file; it must exist. If `None`, the default
    ///   location is used and may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = default_config_path()?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!(path = %default_path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };

        Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    /// Reads and parses a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Replaces the API key if a non-blank override is given
    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key.trim().to_string();
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_cache_ttl(&self) -> Option<Duration> {
        match self.page_cache_ttl_hours {
            0 => None,
            hours => Some(Duration::from_secs(hours * 60 * 60)),
        }
    }
}

/// Location of the config file in the platform configuration directory
///
/// - Linux: ~/.config/tvdbscraper/config.toml
/// - macOS: ~/Library/Application Support/org.tvdbscraper.tvdbscraper/config.toml
/// - Windows: %APPDATA%\tvdbscraper\tvdbscraper\config\config.toml
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = directories::ProjectDirs::from("org", "tvdbscraper", "tvdbscraper")
        .ok_or(ConfigError::ConfigDirectoryNotFound)?;
    Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
}
