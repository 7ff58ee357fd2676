// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Config file discovery and parsing.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::FileConfig;

/// Workspace config file names, probed in order.
pub const CONFIG_FILES: &[&str] = &[
    "mini-agent.yaml",
    "mini-agent.yml",
    "mini-agent.json",
    ".mini-agent.json",
];

/// First existing workspace config file under `dir`, if any.
pub fn find_workspace_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Global config path: `~/.mini-agent/config.yaml`.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mini-agent").join("config.yaml"))
}

/// Parse a config file, choosing the format by extension (`.yaml`/`.yml`
/// parse as YAML, anything else as JSON).
pub fn load_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    match extension {
        "yaml" | "yml" => Ok(serde_yaml::from_str(&contents)?),
        _ => Ok(serde_json::from_str(&contents)?),
    }
}
