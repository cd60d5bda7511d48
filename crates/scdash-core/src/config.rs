//! Dashboard configuration
//!
//! Loaded from `$XDG_CONFIG_HOME/scdash/config.toml` (`~/.config/scdash/`
//! on Linux). A missing file means defaults; CLI flags and environment
//! variables override individual fields afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::CoreError;

/// Runtime settings for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV file loaded at startup
    pub data_path: Option<PathBuf>,

    /// Address the web server binds to
    pub host: String,

    /// Port for the web server
    pub port: u16,

    /// Trailing window (in buckets) for the moving-average overlay
    pub moving_average_window: usize,

    /// Length in days of the default comparison periods
    pub comparison_window_days: u64,

    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            host: "127.0.0.1".to_string(),
            port: 8050,
            moving_average_window: 7,
            comparison_window_days: 30,
            log_level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scdash").join("config.toml"))
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(CoreError::InvalidConfig {
                    message: format!("cannot read {}: {}", path.display(), e),
                })
            }
        };

        let config = Self::from_toml(&content).map_err(|e| match e {
            CoreError::InvalidConfig { message } => CoreError::InvalidConfig {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Load from the default location, or defaults if there is none
    pub fn load_default() -> Result<Self, CoreError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(content).map_err(|e| CoreError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.moving_average_window == 0 {
            return Err(CoreError::InvalidConfig {
                message: "moving_average_window must be at least 1".to_string(),
            });
        }
        if self.host.trim().is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "host must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
