// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One connection to one MCP server.
//!
//! A [`McpConnection`] exclusively owns the spawned child process and its
//! stdio channel (both held inside the rmcp `RunningService`). Connecting is
//! a two-phase exchange: the initialize handshake, then tool discovery. Any
//! failure along the way moves the connection to `Failed` and releases
//! whatever was acquired through the same path normal teardown uses.

use rmcp::model::CallToolRequestParams;
use rmcp::service::{Peer, RoleClient, RunningService, ServiceExt};
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use rmcp::ClientHandler;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::config::ServerSpec;
use super::error::McpError;
use super::types::{ConnectionState, McpToolInfo, McpToolResult};

/// Client-side protocol handler.
///
/// The bridge only issues requests (initialize, list, call); it serves no
/// requests or notifications from the peer, so the default handler suffices.
#[derive(Debug, Clone, Copy, Default)]
struct BridgeClientHandler;

impl ClientHandler for BridgeClientHandler {}

/// Shutdown-time error conditions that are expected and suppressed silently.
///
/// Cancellation and closed-channel errors are normal when teardown is driven
/// by an interrupt or runs from a different task than the one that connected.
/// Anything not on this list is still suppressed so teardown completes, but
/// logged at `warn`.
const BENIGN_SHUTDOWN_ERRORS: &[&str] = &[
    "cancelled",
    "canceled",
    "cancel scope",
    "different task",
    "channel closed",
    "connection closed",
    "transport closed",
    "broken pipe",
];

/// Classify an error message raised during teardown.
pub fn is_benign_shutdown_error(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    BENIGN_SHUTDOWN_ERRORS
        .iter()
        .any(|needle| lower.contains(needle))
}

/// A connection to a single MCP server.
pub struct McpConnection {
    spec: ServerSpec,
    state: ConnectionState,
    service: Option<RunningService<RoleClient, BridgeClientHandler>>,
    tools: Vec<McpToolInfo>,
}

impl McpConnection {
    pub fn new(spec: ServerSpec) -> Self {
        Self {
            spec,
            state: ConnectionState::Disconnected,
            service: None,
            tools: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::Ready
    }

    /// Tools discovered during connect, in the order the server listed them.
    pub fn tools(&self) -> &[McpToolInfo] {
        &self.tools
    }

    /// Spawn the server process, perform the handshake, and discover tools.
    ///
    /// Bounded by the spec's startup timeout. On any failure the connection
    /// releases partially-acquired resources, transitions to `Failed`, and
    /// returns the error. Failures are not retried here.
    pub async fn connect(&mut self) -> Result<(), McpError> {
        match self.state {
            ConnectionState::Disconnected => {}
            ConnectionState::Closed => return Err(McpError::Closed(self.spec.name.clone())),
            other => {
                return Err(McpError::connection_failed(
                    self.spec.name.as_str(),
                    format!("connect() called in state '{other}'"),
                ))
            }
        }

        self.state = ConnectionState::Connecting;
        debug!(server = %self.spec.name, command = %self.spec.command, "connecting to MCP server");

        let result = tokio::time::timeout(self.spec.startup_timeout, self.establish()).await;
        match result {
            Ok(Ok(())) => {
                self.state = ConnectionState::Ready;
                info!(
                    server = %self.spec.name,
                    tools = self.tools.len(),
                    "MCP server ready"
                );
                Ok(())
            }
            Ok(Err(err)) => {
                self.release().await;
                self.state = ConnectionState::Failed;
                Err(err)
            }
            Err(_) => {
                self.release().await;
                self.state = ConnectionState::Failed;
                Err(McpError::ConnectionTimeout {
                    server: self.spec.name.clone(),
                    timeout_secs: self.spec.startup_timeout.as_secs(),
                })
            }
        }
    }

    /// Phase one and two: spawn + initialize, then list tools.
    async fn establish(&mut self) -> Result<(), McpError> {
        let transport = TokioChildProcess::new(Command::new(&self.spec.command).configure(
            |cmd| {
                cmd.args(&self.spec.args);
                for (key, value) in &self.spec.env {
                    cmd.env(key, value);
                }
            },
        ))
        .map_err(|err| McpError::connection_failed(self.spec.name.as_str(), err))?;

        // serve() drives the initialize handshake to completion.
        let service = BridgeClientHandler
            .serve(transport)
            .await
            .map_err(|err| McpError::init_failed(self.spec.name.as_str(), err))?;

        // Held on self so a discovery failure releases it with everything
        // else.
        self.service = Some(service);

        let service = self
            .service
            .as_ref()
            .ok_or_else(|| McpError::NotReady(self.spec.name.clone()))?;
        let listed = service
            .list_all_tools()
            .await
            .map_err(|err| McpError::discovery_failed(self.spec.name.as_str(), err))?;

        self.tools = listed
            .into_iter()
            .map(|tool| McpToolInfo::from_protocol(&self.spec.name, tool))
            .collect();

        Ok(())
    }

    /// A call handle for the live service.
    ///
    /// The handle owns everything an invocation needs, so callers can drop
    /// whatever lock guards this connection and await the call unlocked.
    /// Teardown then never queues behind an in-flight invocation; a call
    /// racing with `disconnect` fails with a closed-channel error instead.
    pub fn invoker(&self) -> Result<ToolInvoker, McpError> {
        if self.state != ConnectionState::Ready {
            return Err(McpError::NotReady(self.spec.name.clone()));
        }
        let service = self
            .service
            .as_ref()
            .ok_or_else(|| McpError::NotReady(self.spec.name.clone()))?;
        Ok(ToolInvoker {
            server: self.spec.name.clone(),
            peer: service.peer().clone(),
        })
    }

    /// Invoke a tool by its server-declared name, forwarding `arguments`
    /// verbatim.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<McpToolResult, McpError> {
        self.invoker()?.call_tool(name, arguments).await
    }

    /// Tear the connection down.
    ///
    /// Idempotent: once `Closed`, further calls are no-ops. Always reaches
    /// `Closed`; teardown errors are classified and suppressed, never
    /// propagated.
    pub async fn disconnect(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.release().await;
        self.tools.clear();
        self.state = ConnectionState::Closed;
        debug!(server = %self.spec.name, "MCP connection closed");
    }

    /// Release the service (channel + child process), suppressing errors.
    ///
    /// Shared by `disconnect` and the failure path of `connect`, so partial
    /// acquisitions never leak.
    async fn release(&mut self) {
        if let Some(service) = self.service.take() {
            match service.cancel().await {
                Ok(_) => {}
                Err(err) => {
                    let message = err.to_string();
                    if is_benign_shutdown_error(&message) {
                        debug!(
                            server = %self.spec.name,
                            error = %message,
                            "benign shutdown error suppressed"
                        );
                    } else {
                        warn!(
                            server = %self.spec.name,
                            error = %message,
                            "unexpected teardown error suppressed"
                        );
                    }
                }
            }
        }
    }
}

/// A cheap clone of the connection's request channel.
///
/// Valid only while the connection is live; once the connection is released
/// the peer's channel closes and calls fail promptly.
#[derive(Clone, Debug)]
pub struct ToolInvoker {
    server: String,
    peer: Peer<RoleClient>,
}

impl ToolInvoker {
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<McpToolResult, McpError> {
        debug!(server = %self.server, tool = name, "invoking MCP tool");
        let result = self
            .peer
            .call_tool(CallToolRequestParams {
                name: name.to_string().into(),
                arguments,
                meta: None,
                task: None,
            })
            .await
            .map_err(|err| McpError::tool_failed(name, err))?;

        Ok(McpToolResult::from_protocol(&result))
    }
}

impl std::fmt::Debug for McpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpConnection")
            .field("name", &self.spec.name)
            .field("state", &self.state)
            .field("tools", &self.tools.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::super::config::ServerEntry;
    use super::*;

    fn spec(command: &str, args: &[&str]) -> ServerSpec {
        let entry = ServerEntry {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            startup_timeout_secs: Some(5),
            ..Default::default()
        };
        ServerSpec::resolve("test", &entry, &HashMap::new()).unwrap()
    }

    #[test]
    fn test_benign_shutdown_classification() {
        assert!(is_benign_shutdown_error("task was cancelled"));
        assert!(is_benign_shutdown_error("Cancelled by runtime"));
        assert!(is_benign_shutdown_error(
            "attempted to exit cancel scope in a different task"
        ));
        assert!(is_benign_shutdown_error("channel closed"));
        assert!(is_benign_shutdown_error("Broken pipe (os error 32)"));

        assert!(!is_benign_shutdown_error("permission denied"));
        assert!(!is_benign_shutdown_error("segmentation fault"));
    }

    #[test]
    fn test_new_connection_is_disconnected() {
        let connection = McpConnection::new(spec("echo", &[]));
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert!(!connection.is_ready());
        assert!(connection.tools().is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure_transitions_to_failed() {
        // /bin/false exits immediately, so the handshake cannot complete.
        let mut connection = McpConnection::new(spec("/bin/false", &[]));
        let err = connection.connect().await.unwrap_err();
        assert_eq!(connection.state(), ConnectionState::Failed);
        assert!(connection.tools().is_empty());
        // the error names the server
        assert!(format!("{err}").contains("test"));
    }

    #[tokio::test]
    async fn test_connect_spawn_failure() {
        let mut connection = McpConnection::new(spec("/no/such/binary", &[]));
        assert!(connection.connect().await.is_err());
        assert_eq!(connection.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_connect_timeout() {
        // sleeps without ever speaking the protocol
        let entry = ServerEntry {
            command: "sleep".to_string(),
            args: vec!["30".to_string()],
            startup_timeout_secs: Some(1),
            ..Default::default()
        };
        let spec = ServerSpec::resolve("slow", &entry, &HashMap::new()).unwrap();

        let mut connection = McpConnection::new(spec);
        let err = connection.connect().await.unwrap_err();
        assert!(matches!(err, McpError::ConnectionTimeout { .. }));
        assert_eq!(connection.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let mut connection = McpConnection::new(spec("echo", &[]));
        connection.disconnect().await;
        assert_eq!(connection.state(), ConnectionState::Closed);
        // second call is a no-op
        connection.disconnect().await;
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_failed_connection_can_close() {
        let mut connection = McpConnection::new(spec("/bin/false", &[]));
        let _ = connection.connect().await;
        assert_eq!(connection.state(), ConnectionState::Failed);
        connection.disconnect().await;
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_connect_after_close_is_rejected() {
        let mut connection = McpConnection::new(spec("echo", &[]));
        connection.disconnect().await;
        let err = connection.connect().await.unwrap_err();
        assert!(matches!(err, McpError::Closed(_)));
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_invoker_requires_ready() {
        let mut connection = McpConnection::new(spec("echo", &[]));
        assert!(matches!(
            connection.invoker().unwrap_err(),
            McpError::NotReady(_)
        ));
        connection.disconnect().await;
        assert!(matches!(
            connection.invoker().unwrap_err(),
            McpError::NotReady(_)
        ));
    }

    #[tokio::test]
    async fn test_call_tool_when_not_ready() {
        let connection = McpConnection::new(spec("echo", &[]));
        let err = connection.call_tool("anything", None).await.unwrap_err();
        assert!(matches!(err, McpError::NotReady(_)));
    }

    #[tokio::test]
    async fn test_connect_failure_is_bounded() {
        let started = std::time::Instant::now();
        let mut connection = McpConnection::new(spec("/bin/false", &[]));
        let _ = connection.connect().await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
