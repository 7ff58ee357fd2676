// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! mini-agent - a compact tool-using agent runtime.
//!
//! An LLM agent CLI whose tools come from two places: built-in handlers
//! (files, shell) and external MCP tool servers bridged in as child
//! processes.
//!
//! # Architecture
//!
//! - [`types`] - core type definitions (Message, ToolDefinition, Provider)
//! - [`error`] - error types and result aliases
//! - [`config`] - configuration loading and merging
//! - [`telemetry`] - tracing initialization
//! - [`providers`] - LLM provider implementations
//! - [`tools`] - tool handlers and registry
//! - [`mcp`] - the MCP tool bridge (server specs, connections, lifecycle)
//! - [`agent`] - the agentic orchestration loop

pub mod agent;
pub mod config;
pub mod error;
pub mod mcp;
pub mod providers;
pub mod telemetry;
pub mod tools;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{AgentError, ConfigError, ProviderError, Result, ToolError};
pub use mcp::{McpConfig, McpLifecycle, ServerSpec};
pub use providers::{create_provider, AnthropicProvider, ProviderType};
pub use types::{
    BoxedProvider, ContentBlock, Message, MessageContent, Provider, ProviderConfig,
    ProviderResponse, Role, StopReason, TokenUsage, ToolCall, ToolDefinition, ToolResult,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
