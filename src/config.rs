use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Application configuration, read from `config.toml`.
///
/// Every field has a default so the file itself is optional; CLI flags
/// override individual values on top of this.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory snapshots are written to.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Write a timestamped historical copy in addition to the latest pointer.
    #[serde(default = "default_keep_history")]
    pub keep_history: bool,
    /// Age limit in days for historical snapshots; 0 disables the sweep.
    #[serde(default = "default_max_snapshot_age_days")]
    pub max_snapshot_age_days: u32,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_data_dir() -> String {
    "data/processed".to_string()
}

fn default_keep_history() -> bool {
    true
}

fn default_max_snapshot_age_days() -> u32 {
    90
}

fn default_port() -> u16 {
    3001
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            keep_history: default_keep_history(),
            max_snapshot_age_days: default_max_snapshot_age_days(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            IngestError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
