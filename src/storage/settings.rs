//! Host configuration storage
//!
//! Loads and saves [`HostConfig`] as `host.json` in the data directory.

use crate::storage::{get_data_dir, StorageError};
use crate::types::HostConfig;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "host.json";

/// Get the config file path
pub fn get_config_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join(CONFIG_FILE))
}

/// Load the host configuration from the data directory
///
/// Returns the default configuration if the file doesn't exist or is corrupted
pub fn load_config() -> HostConfig {
    match get_config_path() {
        Ok(path) => load_config_from(&path),
        Err(e) => {
            tracing::warn!("Failed to locate host config, using defaults: {}", e);
            HostConfig::default()
        }
    }
}

/// Load the host configuration from `path`, falling back to defaults
pub fn load_config_from(path: &Path) -> HostConfig {
    match load_config_internal(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load host config, using defaults: {}", e);
            HostConfig::default()
        }
    }
}

fn load_config_internal(path: &Path) -> Result<HostConfig, StorageError> {
    if !path.exists() {
        tracing::info!("Host config not found, using defaults");
        return Ok(HostConfig::default());
    }

    let json = fs::read_to_string(path)?;
    let mut config: HostConfig = serde_json::from_str(&json)?;
    config.validate();

    tracing::debug!("Loaded host config from {}", path.display());
    Ok(config)
}

/// Save the host configuration to `path`
pub fn save_config(path: &Path, config: &HostConfig) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;

    tracing::debug!("Saved host config to {}", path.display());
    Ok(())
}
