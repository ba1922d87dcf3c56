//! Configuration types for Skyledger.
//!
//! Configuration is loaded from a single YAML file (`skyledger.yaml`).
//!
//! # Sections
//!
//! - **credential**: account id and the environment variables holding the vendor keys
//! - **gateway**: where recorded vendor responses live
//! - **logging**: default tracing filter
//! - **sync**: guards for the chain-driving CLI command

pub mod credential;
pub mod gateway;
pub mod logging;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use credential::CredentialConfig;
pub use gateway::GatewayConfig;
pub use logging::LoggingConfig;

/// Complete Skyledger configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkyledgerConfig {
    /// Vendor credential sources.
    #[serde(default)]
    pub credential: CredentialConfig,

    /// Vendor gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cursor chain settings.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Settings for driving a cursor chain to completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Upper bound on calls issued for a single chain.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
        }
    }
}

fn default_max_pages() -> u32 {
    1000
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SkyledgerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration and resolve relative paths against the file's directory.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        if let Some(fixtures_dir) = &config.gateway.fixtures_dir {
            if !fixtures_dir.is_absolute() {
                config.gateway.fixtures_dir = Some(base_dir.join(fixtures_dir));
            }
        }

        if config.sync.max_pages == 0 {
            return Err(ConfigError::Config(
                "sync.max_pages must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }
}
