//! Configuration management for flightboard.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "flightboard";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "FLIGHTBOARD_";

/// Host used by the default endpoints. Nothing answers there, so an
/// unconfigured `api` source fails loudly instead of showing stale data.
const PLACEHOLDER_API_BASE: &str = "https://invalid-url.com/api";

/// Which backend serves flight data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Bundled static fixtures.
    #[default]
    Json,
    /// The remote flight API.
    Api,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Api => write!(f, "api"),
        }
    }
}

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLIGHTBOARD_`, nested keys split on `__`)
/// 2. TOML config file at `~/.config/flightboard/config.toml`
/// 3. Default values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which backend serves flight data.
    pub data_source: DataSource,
    /// Latency simulated by the fixture source, in milliseconds.
    pub simulated_delay_ms: u64,
    /// Log data-source decisions at info instead of debug.
    pub debug: bool,
    /// Remote API configuration.
    pub api: ApiConfig,
}

/// Remote API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Departures endpoint.
    pub departures: String,
    /// Arrivals endpoint.
    pub arrivals: String,
    /// Traffic-status endpoint.
    pub traffic_status: String,
    /// Follow endpoint. When unset the follow call is simulated locally.
    pub follow: Option<String>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Latency of a simulated follow call, in milliseconds.
    pub follow_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source: DataSource::Json,
            simulated_delay_ms: 100,
            debug: false,
            api: ApiConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            departures: format!("{PLACEHOLDER_API_BASE}/departures"),
            arrivals: format!("{PLACEHOLDER_API_BASE}/arrivals"),
            traffic_status: format!("{PLACEHOLDER_API_BASE}/traffic"),
            follow: None,
            timeout_ms: 5000,
            follow_delay_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from `config_path`, or the default location.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `FLIGHTBOARD_`)
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Self::base_figment()
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate exactly one TOML file, ignoring the environment.
    ///
    /// Unlike [`Config::load_from`], the file must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = Self::base_figment()
            .merge(Toml::string(&contents))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    fn base_figment() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_ms == 0 {
            return Err(Error::config_validation(
                "api.timeout_ms must be greater than 0",
            ));
        }

        let endpoints = [
            ("api.departures", Some(&self.api.departures)),
            ("api.arrivals", Some(&self.api.arrivals)),
            ("api.traffic_status", Some(&self.api.traffic_status)),
            ("api.follow", self.api.follow.as_ref()),
        ];
        for (name, url) in endpoints {
            if let Some(url) = url {
                let parsed = reqwest::Url::parse(url).map_err(|e| {
                    Error::config_validation(format!("{name} is not a valid URL ({url}): {e}"))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(Error::config_validation(format!(
                        "{name} must use http or https: {url}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    /// Get the fixture latency as a Duration.
    #[must_use]
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    /// Get the simulated follow latency as a Duration.
    #[must_use]
    pub fn follow_delay(&self) -> Duration {
        Duration::from_millis(self.api.follow_delay_ms)
    }
}
