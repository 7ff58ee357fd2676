// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! MCP (Model Context Protocol) tool bridge.
//!
//! Connects the agent to external tool servers: independent child processes
//! that expose callable capabilities over the MCP stdio protocol. The wire
//! protocol itself is handled by the `rmcp` crate; this module owns server
//! configuration, connection lifecycle, and the adapter that makes remote
//! tools look like ordinary [`crate::tools::ToolHandler`]s.
//!
//! # Architecture
//!
//! ```text
//!   mcp.json ──► McpConfig ──► ServerSpec (env placeholders resolved)
//!                                  │
//!                                  ▼
//!   McpLifecycle ──connect_all──► McpConnection (spawn, initialize,
//!        │                        discover tools)    │
//!        │                                           ▼
//!        │                              McpToolHandler per discovered tool
//!        │                                           │
//!        └──disconnect_all──► teardown               ▼
//!                                            ToolRegistry / agent loop
//! ```
//!
//! One server failing to start never prevents the others from loading, and
//! teardown is idempotent and safe to drive from a signal-handler task.

pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod tools;
pub mod types;

pub use client::{is_benign_shutdown_error, McpConnection, ToolInvoker};
pub use config::{McpConfig, ServerSpec};
pub use error::McpError;
pub use lifecycle::McpLifecycle;
pub use tools::McpToolHandler;
pub use types::{ConnectionState, McpContent, McpToolInfo, McpToolResult};
