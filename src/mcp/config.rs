// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! MCP server configuration and launch-spec resolution.
//!
//! The configuration file is a JSON document with a top-level `mcpServers`
//! mapping of server name to launch entry:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "files": {
//!       "command": "mcp-files",
//!       "args": ["--root", "."],
//!       "env": {"FILES_TOKEN": "YOUR_TOKEN_HERE"},
//!       "disabled": false
//!     }
//!   }
//! }
//! ```
//!
//! Env values that are empty or placeholder-shaped (`YOUR_` / `your-`
//! prefixes) are resolved against the ambient environment at spec-resolution
//! time; everything else passes through verbatim.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::McpError;

/// Default bound on connect (spawn + handshake + discovery), in seconds.
pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 30;

/// One entry under `mcpServers`, as written in the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Executable to launch. Required; an empty value rejects the entry.
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub disabled: bool,
    /// Optional override for the connect bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_timeout_secs: Option<u64>,
}

/// The full configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpConfig {
    /// Server name to launch entry. BTreeMap keeps resolution order
    /// deterministic.
    #[serde(rename = "mcpServers", default)]
    pub servers: BTreeMap<String, ServerEntry>,
}

impl McpConfig {
    /// Parse a configuration document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, McpError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self, McpError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Resolve all enabled entries into launch specs.
    ///
    /// Disabled entries are skipped (logged, never attempted); entries with
    /// an empty command are rejected with a per-entry diagnostic. Neither
    /// case aborts resolution of the remaining entries.
    pub fn resolve_specs(&self, ambient: &HashMap<String, String>) -> Vec<ServerSpec> {
        let mut specs = Vec::new();
        for (name, entry) in &self.servers {
            if entry.disabled {
                info!(server = %name, "MCP server disabled, skipping");
                continue;
            }
            match ServerSpec::resolve(name, entry, ambient) {
                Ok(spec) => specs.push(spec),
                Err(err) => warn!(server = %name, error = %err, "invalid MCP server entry, skipping"),
            }
        }
        specs
    }
}

/// A validated launch specification for one MCP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSpec {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Resolved environment, applied on top of the inherited process
    /// environment when the child is spawned.
    pub env: BTreeMap<String, String>,
    pub startup_timeout: Duration,
}

impl ServerSpec {
    /// Validate one enabled entry and resolve its env placeholders.
    pub fn resolve(
        name: &str,
        entry: &ServerEntry,
        ambient: &HashMap<String, String>,
    ) -> Result<Self, McpError> {
        if entry.command.trim().is_empty() {
            return Err(McpError::config(name, "missing required field 'command'"));
        }

        let env = entry
            .env
            .iter()
            .map(|(key, value)| (key.clone(), resolve_env_value(key, value, ambient)))
            .collect();

        Ok(Self {
            name: name.to_string(),
            command: entry.command.clone(),
            args: entry.args.clone(),
            env,
            startup_timeout: Duration::from_secs(
                entry
                    .startup_timeout_secs
                    .unwrap_or(DEFAULT_STARTUP_TIMEOUT_SECS),
            ),
        })
    }
}

/// Whether a configured env value asks to be filled in from the ambient
/// environment.
fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value.starts_with("YOUR_") || value.starts_with("your-")
}

/// Resolve one env value.
///
/// Placeholder-shaped values are replaced by the ambient variable of the
/// same key when it exists; otherwise the literal value is kept unchanged.
/// A real problem (e.g. a missing credential) then surfaces as a connection
/// failure instead of being masked here.
fn resolve_env_value(key: &str, value: &str, ambient: &HashMap<String, String>) -> String {
    if is_placeholder(value) {
        if let Some(ambient_value) = ambient.get(key) {
            return ambient_value.clone();
        }
    }
    value.to_string()
}
