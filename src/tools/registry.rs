// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tool registry and dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::types::ToolDefinition;

/// Output produced by a tool execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Plain text output.
    Text(String),
    /// Structured JSON output.
    Structured(serde_json::Value),
    /// A failed execution, reported back to the model rather than raised.
    Error(String),
}

impl ToolOutput {
    pub fn success(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Render the output as the string sent back to the model.
    pub fn content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Error(message) => message.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error(_))
    }
}

/// Core abstraction for tool implementations.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The definition advertised to the provider.
    fn definition(&self) -> ToolDefinition;

    /// Whether this tool can change external state.
    fn is_mutating(&self) -> bool {
        false
    }

    /// Execute the tool with the given JSON arguments.
    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError>;
}

/// Result of dispatching one tool call.
#[derive(Debug)]
pub struct DispatchResult {
    pub tool_name: String,
    pub output: ToolOutput,
    pub duration: Duration,
}

impl DispatchResult {
    pub fn is_error(&self) -> bool {
        !self.output.is_success()
    }
}

/// Maps tool names to handlers and dispatches calls.
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    /// Definition order, preserved for the provider tool list.
    order: Vec<String>,
}

impl ToolRegistry {
    /// Registry pre-populated with the built-in tools.
    pub fn with_defaults() -> Self {
        ToolRegistryBuilder::new()
            .register(super::handlers::ReadFileTool)
            .register(super::handlers::WriteFileTool)
            .register(super::handlers::BashTool)
            .build()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Tool definitions in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.handlers.get(name))
            .map(|handler| handler.definition())
            .collect()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Execute a tool by name.
    ///
    /// Handler errors are converted to an error [`ToolOutput`] so the model
    /// sees the failure and can try something else; only an unknown tool
    /// name surfaces as `ToolError::NotFound`.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<DispatchResult, ToolError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        debug!(tool = name, "dispatching tool call");
        let started = Instant::now();

        let output = match handler.execute(arguments).await {
            Ok(output) => output,
            Err(err) => {
                warn!(tool = name, error = %err, "tool execution failed");
                ToolOutput::error(err.to_string())
            }
        };

        Ok(DispatchResult {
            tool_name: name.to_string(),
            output,
            duration: started.elapsed(),
        })
    }
}

/// Builder for [`ToolRegistry`].
#[derive(Default)]
pub struct ToolRegistryBuilder {
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H: ToolHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn register_arc(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Register the built-in tools.
    pub fn with_defaults(self) -> Self {
        self.register(super::handlers::ReadFileTool)
            .register(super::handlers::WriteFileTool)
            .register(super::handlers::BashTool)
    }

    pub fn build(self) -> ToolRegistry {
        let mut handlers = HashMap::new();
        let mut order = Vec::new();
        for handler in self.handlers {
            let name = handler.definition().name;
            if handlers.insert(name.clone(), handler).is_some() {
                warn!(tool = %name, "duplicate tool name, later registration wins");
            } else {
                order.push(name);
            }
        }
        ToolRegistry { handlers, order }
    }
}
