//! Client configuration loading
//!
//! Backend base URL resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MOODLENS_API_URL`, then `NEXT_PUBLIC_API_URL`)
//! 3. TOML config file
//! 4. Compiled default (`http://localhost:8000`)
//!
//! A missing config file is not an error: defaults are used and startup
//! continues. A config file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Compiled default backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Primary environment variable for the backend base URL
pub const API_URL_ENV: &str = "MOODLENS_API_URL";

/// Fallback environment variable, shared with the web frontend deployment
pub const LEGACY_API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";

/// Quiet period after the last keystroke before a search is issued
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Shortest query (in characters) that is sent to the search endpoint
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Configuration as read from `config.toml`
///
/// Every field is optional; anything missing falls back to the compiled
/// defaults in [`ClientConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Backend base URL
    #[serde(default)]
    pub api_url: Option<String>,

    /// Search debounce delay in milliseconds
    #[serde(default)]
    pub search_debounce_ms: Option<u64>,

    /// Minimum query length that triggers a search
    #[serde(default)]
    pub min_query_len: Option<usize>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without trailing slash
    pub api_url: String,
    pub search_debounce_ms: u64,
    pub min_query_len: usize,
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Resolve configuration from CLI argument, environment, and TOML file
    ///
    /// `config_path` overrides the platform config location; when given,
    /// the file must exist.
    pub fn resolve(cli_api_url: Option<&str>, config_path: Option<&Path>) -> Result<Self> {
        let toml_config = load_toml_config(config_path)?;
        let env_api_url = env_api_url();
        Self::from_sources(cli_api_url, env_api_url.as_deref(), toml_config)
    }

    /// Merge already-loaded sources in priority order
    pub fn from_sources(
        cli_api_url: Option<&str>,
        env_api_url: Option<&str>,
        toml_config: TomlConfig,
    ) -> Result<Self> {
        let (raw_url, source) = if let Some(url) = cli_api_url {
            (url.to_string(), "command line")
        } else if let Some(url) = env_api_url {
            (url.to_string(), "environment")
        } else if let Some(url) = toml_config.api_url.clone() {
            (url, "config file")
        } else {
            (DEFAULT_API_URL.to_string(), "compiled default")
        };

        let api_url = normalize_api_url(&raw_url)?;
        debug!(api_url = %api_url, source, "Resolved backend base URL");

        let min_query_len = toml_config.min_query_len.unwrap_or(DEFAULT_MIN_QUERY_LEN);
        if min_query_len == 0 {
            return Err(Error::InvalidInput(
                "min_query_len must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            search_debounce_ms: toml_config
                .search_debounce_ms
                .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS),
            min_query_len,
            logging: toml_config.logging,
        })
    }

    /// Default configuration pointed at a different backend
    pub fn with_api_url(api_url: &str) -> Result<Self> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            ..Self::default()
        })
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Full URL for a backend endpoint path such as `/search`
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_url, path)
        } else {
            format!("{}/{}", self.api_url, path)
        }
    }

    /// Resolve an image URL returned by the backend
    ///
    /// Absolute `http(s)://` URLs are kept; anything else is treated as a
    /// path on the backend and prefixed with the base URL.
    pub fn resolve_url(&self, url: &str) -> String {
        if is_absolute_http(url) {
            url.to_string()
        } else {
            self.endpoint(url)
        }
    }
}

/// Read the backend URL from the environment, ignoring empty values
fn env_api_url() -> Option<String> {
    [API_URL_ENV, LEGACY_API_URL_ENV]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn is_absolute_http(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Validate a base URL and strip trailing slashes
pub fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if !is_absolute_http(trimmed) {
        return Err(Error::InvalidInput(format!(
            "API URL must start with http:// or https://: {:?}",
            raw
        )));
    }

    let host_and_path = trimmed
        .find("://")
        .map_or(trimmed, |i| &trimmed[i + 3..]);
    if host_and_path.trim_matches('/').is_empty() {
        return Err(Error::InvalidInput(format!("API URL has no host: {:?}", raw)));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Platform config file location (`<config_dir>/moodlens/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("moodlens").join("config.toml"))
}

/// Load the TOML config file
///
/// With an explicit path the file must exist. Without one the platform
/// default location is tried and a missing file yields defaults.
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                info!("No config file found, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    info!("Loaded config file {}", path.display());
    Ok(config)
}
