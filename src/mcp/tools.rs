// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Adapter exposing a discovered MCP tool as a [`ToolHandler`].
//!
//! The adapter is an immutable view over one tool descriptor plus a shared
//! handle to its connection. Invocation failures of any kind (transport
//! errors, a closed connection, the server's error flag) surface as a
//! failed [`ToolOutput`], never as a fault the agent loop has to handle.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::client::McpConnection;
use super::types::{McpToolInfo, McpToolResult, TOOL_RETURNED_ERROR};
use crate::error::ToolError;
use crate::tools::{ToolHandler, ToolOutput};
use crate::types::{InputSchema, ToolDefinition};

/// One remote tool, callable through the shared registry.
pub struct McpToolHandler {
    info: McpToolInfo,
    connection: Arc<RwLock<McpConnection>>,
}

impl McpToolHandler {
    pub fn new(info: McpToolInfo, connection: Arc<RwLock<McpConnection>>) -> Self {
        Self { info, connection }
    }

    pub fn server(&self) -> &str {
        &self.info.server
    }
}

#[async_trait]
impl ToolHandler for McpToolHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.info.qualified_name(), self.info.description.as_str())
            .with_schema(convert_input_schema(&self.info.input_schema))
    }

    // Remote tools declare no mutability metadata we trust; assume the
    // worst.
    fn is_mutating(&self) -> bool {
        true
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let arguments = match arguments {
            serde_json::Value::Object(map) => Some(map),
            serde_json::Value::Null => None,
            other => {
                return Ok(ToolOutput::error(format!(
                    "Tool arguments must be an object, got: {other}"
                )))
            }
        };

        // Take the call handle out of a short-lived guard; the call itself
        // must await unlocked so teardown is never queued behind it.
        let invoker = {
            let connection = self.connection.read().await;
            connection.invoker()
        };
        let invoker = match invoker {
            Ok(invoker) => invoker,
            Err(err) => return Ok(ToolOutput::error(err.to_string())),
        };

        match invoker.call_tool(&self.info.name, arguments).await {
            Ok(result) if result.success => Ok(ToolOutput::success(result.as_text())),
            Ok(result) => Ok(failure_output(result)),
            Err(err) => Ok(ToolOutput::error(err.to_string())),
        }
    }
}

/// Render a result the server flagged as an error: its error message (or the
/// fixed diagnostic), followed by any content fragments.
fn failure_output(result: McpToolResult) -> ToolOutput {
    let text = result.as_text();
    let message = result
        .error
        .unwrap_or_else(|| TOOL_RETURNED_ERROR.to_string());
    if text.is_empty() {
        ToolOutput::error(message)
    } else {
        ToolOutput::error(format!("{message}\n{text}"))
    }
}

/// Convert a JSON Schema document into the [`InputSchema`] shape providers
/// expect. Unknown or missing pieces degrade to an empty object schema.
fn convert_input_schema(schema: &serde_json::Value) -> InputSchema {
    let mut input_schema = InputSchema::empty();

    if let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) {
        for (name, property) in properties {
            input_schema = input_schema.with_property(name.as_str(), property.clone());
        }
    }

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        let required: Vec<String> = required
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
        if !required.is_empty() {
            input_schema = input_schema.with_required(required);
        }
    }

    input_schema
}
