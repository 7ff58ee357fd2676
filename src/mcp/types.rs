// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! MCP data types: connection state, tool descriptors, and call results.

use rmcp::model::{CallToolResult, RawContent, ResourceContents, Tool as ProtocolTool};
use serde::{Deserialize, Serialize};

/// Connection lifecycle state.
///
/// ```text
/// Disconnected ──► Connecting ──► Ready ──► Closed
///                       │                     ▲
///                       └──────► Failed ──────┘
/// ```
///
/// `Closed` is terminal: re-entering it is a no-op and nothing transitions
/// out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Ready,
    Failed,
    Closed,
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// A tool discovered on an MCP server. Read-only after discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolInfo {
    /// Tool name as declared by the server.
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub input_schema: serde_json::Value,
    /// Name of the server that exposes this tool.
    pub server: String,
}

impl McpToolInfo {
    pub fn from_protocol(server: &str, tool: ProtocolTool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool
                .description
                .as_deref()
                .unwrap_or("MCP tool")
                .to_string(),
            input_schema: serde_json::Value::Object((*tool.input_schema).clone()),
            server: server.to_string(),
        }
    }

    /// Registry name: `mcp__{server}_{tool}`.
    ///
    /// The prefix keeps remote tools from shadowing built-ins, and the
    /// server component disambiguates identically-named tools exposed by
    /// different servers.
    pub fn qualified_name(&self) -> String {
        format!("mcp__{}_{}", self.server, self.name)
    }
}

/// One fragment of a tool call response.
///
/// The protocol returns a sequence of typed content items; only text is
/// meaningful to the agent, so everything else is kept as its generic
/// rendered form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum McpContent {
    Text { text: String },
    Other { rendered: String },
}

impl McpContent {
    fn from_raw(raw: &RawContent) -> Self {
        match raw {
            RawContent::Text(text) => Self::Text {
                text: text.text.clone(),
            },
            RawContent::Image(image) => Self::Other {
                rendered: format!("[image: {}]", image.mime_type),
            },
            RawContent::Audio(audio) => Self::Other {
                rendered: format!("[audio: {}]", audio.mime_type),
            },
            RawContent::Resource(resource) => {
                let uri = match &resource.resource {
                    ResourceContents::TextResourceContents { uri, .. } => uri,
                    ResourceContents::BlobResourceContents { uri, .. } => uri,
                };
                Self::Other {
                    rendered: format!("[resource: {uri}]"),
                }
            }
            RawContent::ResourceLink(link) => Self::Other {
                rendered: format!("[resource-link: {}]", link.uri),
            },
        }
    }

    pub fn render(&self) -> &str {
        match self {
            Self::Text { text } => text,
            Self::Other { rendered } => rendered,
        }
    }
}

/// The translated result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolResult {
    pub success: bool,
    pub content: Vec<McpContent>,
    /// Set when the server flagged the result as an error. The protocol
    /// carries no structured detail beyond the flag, so this is a fixed
    /// diagnostic.
    pub error: Option<String>,
}

/// Diagnostic used when a server sets the error flag on a result.
pub const TOOL_RETURNED_ERROR: &str = "Tool returned error";

impl McpToolResult {
    pub fn from_protocol(result: &CallToolResult) -> Self {
        let content: Vec<McpContent> = result
            .content
            .iter()
            .map(|item| McpContent::from_raw(&item.raw))
            .collect();
        let is_error = result.is_error.unwrap_or(false);
        Self {
            success: !is_error,
            content,
            error: is_error.then(|| TOOL_RETURNED_ERROR.to_string()),
        }
    }

    /// All fragments joined by newline.
    pub fn as_text(&self) -> String {
        self.content
            .iter()
            .map(McpContent::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::Content;

    use super::*;

    fn protocol_result(content: Vec<Content>, is_error: Option<bool>) -> CallToolResult {
        CallToolResult {
            content,
            is_error,
            structured_content: None,
            meta: None,
        }
    }

    fn text(t: &str) -> McpContent {
        McpContent::Text {
            text: t.to_string(),
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Ready.to_string(), "ready");
        assert_eq!(ConnectionState::Closed.to_string(), "closed");
    }

    #[test]
    fn test_state_terminal() {
        assert!(ConnectionState::Closed.is_terminal());
        assert!(!ConnectionState::Failed.is_terminal());
        assert!(!ConnectionState::Ready.is_terminal());
    }

    #[test]
    fn test_qualified_name() {
        let info = McpToolInfo {
            name: "search".to_string(),
            description: String::new(),
            input_schema: serde_json::json!({}),
            server: "files".to_string(),
        };
        assert_eq!(info.qualified_name(), "mcp__files_search");
    }

    #[test]
    fn test_as_text_joins_fragments_with_newline() {
        let result = McpToolResult {
            success: true,
            content: vec![
                text("first"),
                McpContent::Other {
                    rendered: "[image: image/png]".to_string(),
                },
                text("last"),
            ],
            error: None,
        };
        assert_eq!(result.as_text(), "first\n[image: image/png]\nlast");
    }

    #[test]
    fn test_from_protocol_text_content() {
        let protocol = protocol_result(vec![Content::text("a"), Content::text("b")], None);
        let result = McpToolResult::from_protocol(&protocol);
        assert!(result.success);
        assert_eq!(result.as_text(), "a\nb");
    }

    #[test]
    fn test_error_flag_yields_fixed_diagnostic() {
        let protocol = protocol_result(vec![Content::text("detail")], Some(true));
        let result = McpToolResult::from_protocol(&protocol);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(TOOL_RETURNED_ERROR));
        // content is still carried alongside the flag
        assert_eq!(result.as_text(), "detail");
    }

    #[test]
    fn test_no_error_flag_is_success() {
        let protocol = protocol_result(vec![], Some(false));
        let result = McpToolResult::from_protocol(&protocol);
        assert!(result.success);
        assert!(result.error.is_none());
    }
}
