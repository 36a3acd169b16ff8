//! Application configuration, read from an optional JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::segment::SegmentThresholds;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "RUSTY_CHURN_CONFIG";
/// Environment variable overriding `data_path`.
pub const DATA_ENV: &str = "RUSTY_CHURN_DATA";
pub const DEFAULT_CONFIG_PATH: &str = "rusty-churn.json";
pub const DEFAULT_DATA_PATH: &str = "data/cleaned_data/bankchurners.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Customer table (.csv, .json or .parquet)
    pub data_path: PathBuf,
    /// Risk segmentation cut-offs
    pub thresholds: SegmentThresholds,
    /// External report shown as a link in the Report tab
    pub report_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            thresholds: SegmentThresholds::default(),
            report_url: None,
        }
    }
}

impl AppConfig {
    /// Load from JSON if the file exists; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`AppConfig::load`], but a broken file only costs a warning.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("{e}; using default configuration");
            Self::default()
        })
    }

    /// Resolve the full configuration from the process environment.
    ///
    /// Precedence for the data path: first CLI argument, then `RUSTY_CHURN_DATA`,
    /// then the config file.
    pub fn from_env() -> Self {
        let config_path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = Self::load_or_default(&config_path);
        config.apply_overrides(
            std::env::var(DATA_ENV).ok().map(PathBuf::from),
            std::env::args().nth(1).map(PathBuf::from),
        );
        config
    }

    pub fn apply_overrides(&mut self, env_data: Option<PathBuf>, cli_data: Option<PathBuf>) {
        if let Some(path) = cli_data.or(env_data) {
            self.data_path = path;
        }
    }
}
