// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Execute a shell command with a timeout and output truncation.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::ToolError;
use crate::tools::registry::{ToolHandler, ToolOutput};
use crate::tools::{
    parse_arguments, truncate_output, DEFAULT_TIMEOUT_MS, MAX_OUTPUT_LINES, MAX_TIMEOUT_MS,
};
use crate::types::{InputSchema, ToolDefinition};

#[derive(Debug, Deserialize)]
struct BashArgs {
    command: String,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

/// Runs a command under `sh -c`.
pub struct BashTool;

#[async_trait]
impl ToolHandler for BashTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "bash",
            "Execute a shell command and return its combined output. \
             Long output is truncated in the middle.",
        )
        .with_schema(
            InputSchema::empty()
                .with_property(
                    "command",
                    serde_json::json!({
                        "type": "string",
                        "description": "The command to execute"
                    }),
                )
                .with_property(
                    "timeout_ms",
                    serde_json::json!({
                        "type": "integer",
                        "description": "Timeout in milliseconds (default 120000, max 600000)"
                    }),
                )
                .with_required(vec!["command".to_string()]),
        )
    }

    fn is_mutating(&self) -> bool {
        true
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let args: BashArgs = parse_arguments(&arguments)?;

        if args.command.trim().is_empty() {
            return Err(ToolError::InvalidInput("command is empty".to_string()));
        }

        let timeout_ms = args
            .timeout_ms
            .unwrap_or(DEFAULT_TIMEOUT_MS)
            .min(MAX_TIMEOUT_MS);

        let child = Command::new("sh")
            .arg("-c")
            .arg(&args.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| ToolError::ExecutionFailed(format!("failed to spawn: {err}")))?;

        let output = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| ToolError::Timeout(timeout_ms))?
        .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let mut combined = String::new();
        combined.push_str(stdout.trim_end());
        if !stderr.trim().is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(stderr.trim_end());
        }

        let combined = truncate_output(&combined, MAX_OUTPUT_LINES);

        if output.status.success() {
            Ok(ToolOutput::success(combined))
        } else {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            Ok(ToolOutput::error(format!(
                "Command exited with status {code}\n{combined}"
            )))
        }
    }
}
