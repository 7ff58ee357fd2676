// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Read a file from disk with line numbering and windowing.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::tools::registry::{ToolHandler, ToolOutput};
use crate::tools::{parse_arguments, DEFAULT_READ_LIMIT};
use crate::types::{InputSchema, ToolDefinition};

#[derive(Debug, Deserialize)]
struct ReadFileArgs {
    file_path: String,
    #[serde(default)]
    offset: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
}

/// Reads a text file, returning numbered lines.
pub struct ReadFileTool;

#[async_trait]
impl ToolHandler for ReadFileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "read_file",
            "Read a file from the filesystem. Returns numbered lines. \
             Use offset and limit to read a window of a large file.",
        )
        .with_schema(
            InputSchema::empty()
                .with_property(
                    "file_path",
                    serde_json::json!({
                        "type": "string",
                        "description": "Absolute path to the file to read"
                    }),
                )
                .with_property(
                    "offset",
                    serde_json::json!({
                        "type": "integer",
                        "description": "1-based line number to start reading from"
                    }),
                )
                .with_property(
                    "limit",
                    serde_json::json!({
                        "type": "integer",
                        "description": "Maximum number of lines to read"
                    }),
                )
                .with_required(vec!["file_path".to_string()]),
        )
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let args: ReadFileArgs = parse_arguments(&arguments)?;

        if args.file_path.is_empty() {
            return Err(ToolError::InvalidInput("file_path is empty".to_string()));
        }

        let contents = tokio::fs::read_to_string(&args.file_path).await?;

        let offset = args.offset.unwrap_or(1).max(1);
        let limit = args.limit.unwrap_or(DEFAULT_READ_LIMIT);

        let mut lines = Vec::new();
        for (index, line) in contents.lines().enumerate().skip(offset - 1).take(limit) {
            lines.push(format!("{:>6}\t{}", index + 1, line));
        }

        if lines.is_empty() {
            return Ok(ToolOutput::success(format!(
                "{} is empty or offset is past end of file",
                args.file_path
            )));
        }

        Ok(ToolOutput::success(lines.join("\n")))
    }
}
