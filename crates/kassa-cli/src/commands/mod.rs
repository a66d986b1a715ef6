//! Subcommand implementations.

pub mod config;
pub mod ingest;
pub mod process;
pub mod report;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use kassa_core::models::config::KassaConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kassa")
        .join("config.json")
}

/// Defaults as seen from the command line: the store lives in the user's
/// data directory.
pub fn cli_defaults() -> KassaConfig {
    let mut config = KassaConfig::default();
    if let Some(data_dir) = dirs::data_dir() {
        config.store.root = data_dir.join("kassa");
    }
    config
}

/// Load the configuration named by `--config`, else the default file when
/// it exists, else the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<KassaConfig> {
    let path = match config_path {
        Some(path) => PathBuf::from(path),
        None => {
            let path = default_config_path();
            if !path.exists() {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(cli_defaults());
            }
            path
        }
    };

    read_config(&path)
}

fn read_config(path: &Path) -> anyhow::Result<KassaConfig> {
    debug!("Loading configuration from {}", path.display());
    KassaConfig::from_file(path)
        .with_context(|| format!("Failed to read configuration from {}", path.display()))
}
