// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Bulk connect/disconnect of MCP servers.
//!
//! [`McpLifecycle`] owns the list of live connections for one program run.
//! It is a plain value the caller constructs and threads through; nothing
//! here lives in a process-wide static.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::client::McpConnection;
use super::config::{McpConfig, ServerSpec};
use super::tools::McpToolHandler;
use crate::tools::ToolHandler;

/// Owns every live MCP connection and orchestrates bulk lifecycle
/// operations.
#[derive(Default)]
pub struct McpLifecycle {
    connections: Vec<Arc<RwLock<McpConnection>>>,
}

impl McpLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Attempt every spec in input order and return the flattened list of
    /// tool adapters from the servers that connected.
    ///
    /// One server's failure never aborts the rest: a failed connect is
    /// logged and skipped, contributing zero tools. The result is not
    /// deduplicated by tool name.
    pub async fn connect_all(&mut self, specs: Vec<ServerSpec>) -> Vec<Arc<dyn ToolHandler>> {
        let mut handlers: Vec<Arc<dyn ToolHandler>> = Vec::new();

        for spec in specs {
            let name = spec.name.clone();
            let mut connection = McpConnection::new(spec);
            match connection.connect().await {
                Ok(()) => {
                    let tools = connection.tools().to_vec();
                    let shared = Arc::new(RwLock::new(connection));
                    for info in tools {
                        handlers.push(Arc::new(McpToolHandler::new(info, Arc::clone(&shared))));
                    }
                    self.connections.push(shared);
                }
                Err(err) => {
                    warn!(server = %name, error = %err, "skipping MCP server");
                }
            }
        }

        handlers
    }

    /// Disconnect every live connection and clear the list.
    ///
    /// Each teardown is independently guarded (a connection's disconnect
    /// never raises), the list is cleared unconditionally, and calling this
    /// again on an empty list is a no-op. Safe to drive from a different
    /// task than the one that connected, e.g. a signal handler.
    pub async fn disconnect_all(&mut self) {
        if self.connections.is_empty() {
            return;
        }
        info!(
            connections = self.connections.len(),
            "disconnecting MCP servers"
        );
        for connection in self.connections.drain(..) {
            connection.write().await.disconnect().await;
        }
    }

    /// Convenience: load a configuration file, resolve specs against the
    /// current process environment, and connect.
    ///
    /// A missing file is not an error (zero tools, logged); an unparsable
    /// file fails the load step only (zero tools, diagnostic logged).
    pub async fn load_tools(&mut self, path: &Path) -> Vec<Arc<dyn ToolHandler>> {
        if !path.exists() {
            info!(path = %path.display(), "no MCP configuration found");
            return Vec::new();
        }

        let config = match McpConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load MCP configuration");
                return Vec::new();
            }
        };

        let ambient: HashMap<String, String> = std::env::vars().collect();
        self.connect_all(config.resolve_specs(&ambient)).await
    }
}

impl std::fmt::Debug for McpLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpLifecycle")
            .field("connections", &self.connections.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::super::config::ServerEntry;
    use super::*;

    fn spec(name: &str, command: &str) -> ServerSpec {
        let entry = ServerEntry {
            command: command.to_string(),
            startup_timeout_secs: Some(5),
            ..Default::default()
        };
        ServerSpec::resolve(name, &entry, &HashMap::new()).unwrap()
    }

    #[tokio::test]
    async fn test_connect_all_isolates_failures() {
        let mut lifecycle = McpLifecycle::new();
        let handlers = lifecycle
            .connect_all(vec![spec("a", "/bin/false"), spec("b", "/no/such/binary")])
            .await;
        assert!(handlers.is_empty());
        assert_eq!(lifecycle.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_all_empty_specs() {
        let mut lifecycle = McpLifecycle::new();
        let handlers = lifecycle.connect_all(Vec::new()).await;
        assert!(handlers.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_all_twice_is_noop() {
        let mut lifecycle = McpLifecycle::new();
        lifecycle.disconnect_all().await;
        lifecycle.disconnect_all().await;
        assert_eq!(lifecycle.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_load_tools_missing_file() {
        let mut lifecycle = McpLifecycle::new();
        let handlers = lifecycle
            .load_tools(Path::new("/no/such/mcp.json"))
            .await;
        assert!(handlers.is_empty());
    }

    #[tokio::test]
    async fn test_load_tools_unparsable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcp.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut lifecycle = McpLifecycle::new();
        let handlers = lifecycle.load_tools(&path).await;
        assert!(handlers.is_empty());
        assert_eq!(lifecycle.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_load_tools_failing_server() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcp.json");
        std::fs::write(
            &path,
            r#"{"mcpServers": {"s1": {"command": "/bin/false", "startup_timeout_secs": 5}}}"#,
        )
        .unwrap();

        let mut lifecycle = McpLifecycle::new();
        let handlers = lifecycle.load_tools(&path).await;
        assert!(handlers.is_empty());
    }

    #[tokio::test]
    async fn test_load_tools_disabled_server_never_attempted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcp.json");
        // "command" here would fail to speak the protocol if it were ever
        // spawned; disabled means it must not be.
        std::fs::write(
            &path,
            r#"{"mcpServers": {"s1": {"command": "echo", "disabled": true}}}"#,
        )
        .unwrap();

        let mut lifecycle = McpLifecycle::new();
        let handlers = lifecycle.load_tools(&path).await;
        assert!(handlers.is_empty());
        assert_eq!(lifecycle.connection_count(), 0);
    }
}
