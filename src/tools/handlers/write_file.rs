// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Write a file to disk, creating parent directories as needed.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::tools::parse_arguments;
use crate::tools::registry::{ToolHandler, ToolOutput};
use crate::types::{InputSchema, ToolDefinition};

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
    file_path: String,
    content: String,
}

/// Writes content to a file, replacing any existing content.
pub struct WriteFileTool;

#[async_trait]
impl ToolHandler for WriteFileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "write_file",
            "Write content to a file, creating it (and parent directories) \
             if needed and overwriting any existing content.",
        )
        .with_schema(
            InputSchema::empty()
                .with_property(
                    "file_path",
                    serde_json::json!({
                        "type": "string",
                        "description": "Absolute path to the file to write"
                    }),
                )
                .with_property(
                    "content",
                    serde_json::json!({
                        "type": "string",
                        "description": "Content to write"
                    }),
                )
                .with_required(vec!["file_path".to_string(), "content".to_string()]),
        )
    }

    fn is_mutating(&self) -> bool {
        true
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let args: WriteFileArgs = parse_arguments(&arguments)?;

        if args.file_path.is_empty() {
            return Err(ToolError::InvalidInput("file_path is empty".to_string()));
        }

        if let Some(parent) = Path::new(&args.file_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(&args.file_path, &args.content).await?;

        Ok(ToolOutput::success(format!(
            "Wrote {} bytes to {}",
            args.content.len(),
            args.file_path
        )))
    }
}
