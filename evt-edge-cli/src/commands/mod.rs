pub mod check;
pub mod routes;
pub mod serve;

use anyhow::Result;
use evt_edge_core::config::{EdgeConfig, DEFAULT_CONFIG_FILE};
use std::path::Path;

/// Defaults, then the config file, then the environment
pub fn load_config(path: Option<&Path>) -> Result<EdgeConfig> {
    match path {
        Some(path) => {
            anyhow::ensure!(path.exists(), "config file {} not found", path.display());
            EdgeConfig::load_from(path)
        }
        None => EdgeConfig::load_from(DEFAULT_CONFIG_FILE),
    }
}
