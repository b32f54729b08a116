//! Configuration management for speedcontrol.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use chrono::NaiveTime;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::service::{AvailabilityWindow, WINDOW_TIME_FORMAT};
use crate::store::file::DEFAULT_EXTENSION;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default application directory name.
const APP_DIR_NAME: &str = "speedcontrol";

/// Default directory name for partition files.
const RECORDS_DIR_NAME: &str = "records";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SPEEDCONTROL_`, `__` between
///    section and key, e.g. `SPEEDCONTROL_STORE__DATA_DIR`)
/// 2. TOML config file at `~/.config/speedcontrol/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub store: StoreConfig,
    /// Service configuration.
    pub service: ServiceConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the per-day partition files.
    /// Defaults to `~/.local/share/speedcontrol/records`
    pub data_dir: Option<PathBuf>,
    /// Extension of partition files, without the dot.
    pub file_extension: String,
}

/// Service-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Start of the daily availability window (`HH:MM`, local time).
    pub time_start: String,
    /// End of the daily availability window (`HH:MM`, local time).
    pub time_end: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Will be resolved to default at runtime
            file_extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            time_start: "00:00".to_string(),
            time_end: "23:59".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SPEEDCONTROL_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(APP_DIR_NAME)
            .join(RECORDS_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let extension = &self.store.file_extension;
        if extension.is_empty() || extension.contains(['.', '/', '\\']) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "file_extension '{extension}' must be non-empty and contain no dots or path separators"
                ),
            });
        }

        let start = parse_window_time("time_start", &self.service.time_start)?;
        let end = parse_window_time("time_end", &self.service.time_end)?;
        if start > end {
            return Err(Error::ConfigValidation {
                message: format!(
                    "time_start ({}) cannot be after time_end ({})",
                    self.service.time_start, self.service.time_end
                ),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.store
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the availability window.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is not a valid `HH:MM` time.
    pub fn availability_window(&self) -> Result<AvailabilityWindow> {
        Ok(AvailabilityWindow::new(
            parse_window_time("time_start", &self.service.time_start)?,
            parse_window_time("time_end", &self.service.time_end)?,
        ))
    }
}

fn parse_window_time(key: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, WINDOW_TIME_FORMAT).map_err(|err| Error::ConfigValidation {
        message: format!("{key} '{value}' is not a valid HH:MM time: {err}"),
    })
}
