//! Runtime configuration
//!
//! Sources, later wins: defaults, JSON file, environment, CLI flags.
//! CLI flags are applied by the binary on top of `HubConfig::load`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_DATA_DIR: &str = "HUB_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "HUB_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Root directory; the journal lives in `<data_dir>/journal`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Rebuild state from the journal on open
    #[serde(default = "default_true")]
    pub replay_on_start: bool,

    /// Refuse to open a journal whose hash chain is broken
    #[serde(default = "default_true")]
    pub verify_chain_on_start: bool,

    /// Mailbox size of `HubService`
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            replay_on_start: default_true(),
            verify_chain_on_start: default_true(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl HubConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the optional file, then the process environment
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Override fields from `HUB_DATA_DIR` / `HUB_LOG_LEVEL` via `lookup`
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be at least 1"));
        }
        Ok(())
    }

    pub fn journal_dir(&self) -> PathBuf {
        self.data_dir.join("journal")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}
