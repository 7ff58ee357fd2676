// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! MCP error types.
//!
//! Each variant is fatal only to its own entity: config errors reject one
//! server entry, connect errors fail one connection, tool-call errors fail
//! one invocation. None of them abort sibling operations.

use thiserror::Error;

/// Errors from the MCP tool bridge.
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Invalid server configuration for '{server}': {message}")]
    Config { server: String, message: String },

    #[error("Failed to connect to MCP server '{server}': {message}")]
    ConnectionFailed { server: String, message: String },

    #[error("MCP server '{server}' did not become ready within {timeout_secs}s")]
    ConnectionTimeout { server: String, timeout_secs: u64 },

    #[error("MCP handshake with '{server}' failed: {message}")]
    InitializationFailed { server: String, message: String },

    #[error("Tool discovery on '{server}' failed: {message}")]
    DiscoveryFailed { server: String, message: String },

    #[error("Tool call '{tool}' failed: {message}")]
    ToolCallFailed { tool: String, message: String },

    #[error("MCP server '{0}' is not connected")]
    NotReady(String),

    #[error("MCP server '{0}' is closed")]
    Closed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn config(server: impl Into<String>, message: impl ToString) -> Self {
        Self::Config {
            server: server.into(),
            message: message.to_string(),
        }
    }

    pub fn connection_failed(server: impl Into<String>, message: impl ToString) -> Self {
        Self::ConnectionFailed {
            server: server.into(),
            message: message.to_string(),
        }
    }

    pub fn init_failed(server: impl Into<String>, message: impl ToString) -> Self {
        Self::InitializationFailed {
            server: server.into(),
            message: message.to_string(),
        }
    }

    pub fn discovery_failed(server: impl Into<String>, message: impl ToString) -> Self {
        Self::DiscoveryFailed {
            server: server.into(),
            message: message.to_string(),
        }
    }

    pub fn tool_failed(tool: impl Into<String>, message: impl ToString) -> Self {
        Self::ToolCallFailed {
            tool: tool.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = McpError::ConnectionTimeout {
            server: "files".to_string(),
            timeout_secs: 30,
        };
        let display = format!("{err}");
        assert!(display.contains("files"));
        assert!(display.contains("30"));
    }

    #[test]
    fn test_helper_constructors() {
        let err = McpError::connection_failed("files", "spawn failed");
        assert!(matches!(err, McpError::ConnectionFailed { .. }));

        let err = McpError::tool_failed("search", "channel closed");
        assert!(format!("{err}").contains("search"));
    }
}
