//! CLI configuration: where the repository's storage backend lives.
//! Resolved from `$AKASHICA_HOME/config.toml`, falling back to the OS
//! config directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    Local { path: PathBuf },
    #[cfg(feature = "s3")]
    S3 {
        bucket: String,
        endpoint: Option<String>,
        region: Option<String>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Local {
            path: PathBuf::from(".akashica"),
        }
    }
}

impl Config {
    pub fn home_dir() -> Result<PathBuf> {
        if let Some(home) = std::env::var_os("AKASHICA_HOME") {
            return Ok(PathBuf::from(home));
        }
        dirs::config_dir()
            .map(|d| d.join("akashica"))
            .context("could not determine config directory")
    }

    pub fn path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(&path, &content).context("failed to write config file")
    }
}
