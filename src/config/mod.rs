// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading and merging.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. global `~/.mini-agent/config.yaml`
//! 2. workspace file (`mini-agent.yaml`, `mini-agent.json`, or
//!    `.mini-agent.json` in the working directory)
//! 3. command-line flags

mod loader;

pub use loader::{find_workspace_config, global_config_path, load_config_file, CONFIG_FILES};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default request budget for a single model response.
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Settings as written in a config file. Every field optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_prompt: Option<String>,
    /// Path to the MCP server configuration file.
    pub mcp_config: Option<PathBuf>,
}

impl FileConfig {
    /// Overlay `other` on top of `self`.
    fn merge(mut self, other: FileConfig) -> Self {
        self.provider = other.provider.or(self.provider);
        self.model = other.model.or(self.model);
        self.base_url = other.base_url.or(self.base_url);
        self.api_key = other.api_key.or(self.api_key);
        self.max_tokens = other.max_tokens.or(self.max_tokens);
        self.temperature = other.temperature.or(self.temperature);
        self.system_prompt = other.system_prompt.or(self.system_prompt);
        self.mcp_config = other.mcp_config.or(self.mcp_config);
        self
    }
}

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub mcp_config: Option<PathBuf>,
    pub no_tools: bool,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub system_prompt: Option<String>,
    pub mcp_config: PathBuf,
    pub no_tools: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: None,
            base_url: None,
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            system_prompt: None,
            mcp_config: PathBuf::from("mcp.json"),
            no_tools: false,
        }
    }
}

/// Load and merge configuration for a run rooted at `workspace_dir`.
pub fn load_config(workspace_dir: &Path, cli: CliOptions) -> Result<Config, ConfigError> {
    let mut file_config = FileConfig::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            file_config = file_config.merge(load_config_file(&global_path)?);
        }
    }

    if let Some(workspace_path) = find_workspace_config(workspace_dir) {
        file_config = file_config.merge(load_config_file(&workspace_path)?);
    }

    let defaults = Config::default();
    Ok(Config {
        provider: cli
            .provider
            .or(file_config.provider)
            .unwrap_or(defaults.provider),
        model: cli.model.or(file_config.model),
        base_url: cli.base_url.or(file_config.base_url),
        api_key: file_config.api_key,
        max_tokens: file_config.max_tokens.unwrap_or(defaults.max_tokens),
        temperature: file_config.temperature,
        system_prompt: file_config.system_prompt,
        mcp_config: cli
            .mcp_config
            .or(file_config.mcp_config)
            .unwrap_or(defaults.mcp_config),
        no_tools: cli.no_tools,
    })
}
