// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Anthropic Messages API provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::providers::ProviderType;
use crate::types::{
    Message, MessageContent, Provider, ProviderConfig, ProviderResponse, Role, StopReason,
    TokenUsage, ToolCall, ToolDefinition,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl AnthropicProvider {
    pub fn new(api_key: String, config: ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: config
                .model
                .unwrap_or_else(|| ProviderType::Anthropic.default_model().to_string()),
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: config.max_tokens.unwrap_or(8192),
            temperature: config.temperature,
        }
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        system_prompt: Option<&str>,
    ) -> ApiRequest {
        let api_messages = messages
            .iter()
            .filter(|message| message.role != Role::System)
            .map(ApiMessage::from)
            .collect();

        ApiRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: api_messages,
            system: system_prompt.map(str::to_string),
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.to_vec())
            },
            temperature: self.temperature,
        }
    }

    fn parse_response(&self, response: ApiResponse) -> ProviderResponse {
        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block {
                ResponseBlock::Text { text } => content.push_str(&text),
                ResponseBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall { id, name, input })
                }
                ResponseBlock::Unknown => {}
            }
        }

        let stop_reason = response.stop_reason.as_deref().map(|reason| match reason {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            _ => StopReason::Other,
        });

        ProviderResponse {
            content,
            tool_calls,
            stop_reason,
            usage: response.usage.map(|usage| TokenUsage {
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
            }),
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        system_prompt: Option<&str>,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = self.build_request(messages, tools, system_prompt);
        debug!(model = %self.model, messages = messages.len(), "sending chat request");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => ProviderError::AuthError(body),
                429 => ProviderError::RateLimited(body),
                code => ProviderError::api(body, code),
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::ParseError(err.to_string()))?;

        Ok(self.parse_response(api_response))
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: serde_json::Value,
}

impl From<&Message> for ApiMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            Role::Assistant => "assistant",
            _ => "user",
        };
        let content = match &message.content {
            MessageContent::Text(text) => serde_json::Value::String(text.clone()),
            MessageContent::Blocks(blocks) => {
                serde_json::to_value(blocks).unwrap_or(serde_json::Value::Null)
            }
        };
        Self { role, content }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentBlock;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new("sk-test".to_string(), ProviderConfig::default())
    }

    #[test]
    fn test_build_request_filters_system_messages() {
        let messages = vec![
            Message {
                role: Role::System,
                content: MessageContent::Text("sys".to_string()),
            },
            Message::user("hello"),
        ];
        let request = provider().build_request(&messages, &[], Some("prompt"));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.system.as_deref(), Some("prompt"));
    }

    #[test]
    fn test_build_request_omits_empty_tools() {
        let request = provider().build_request(&[Message::user("hi")], &[], None);
        assert!(request.tools.is_none());

        let tools = vec![ToolDefinition::new("read_file", "Read a file")];
        let request = provider().build_request(&[Message::user("hi")], &tools, None);
        assert_eq!(request.tools.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_parse_response_text_and_tool_use() {
        let response = ApiResponse {
            content: vec![
                ResponseBlock::Text {
                    text: "Let me check.".to_string(),
                },
                ResponseBlock::ToolUse {
                    id: "tu_1".to_string(),
                    name: "read_file".to_string(),
                    input: serde_json::json!({"file_path": "/tmp/x"}),
                },
            ],
            stop_reason: Some("tool_use".to_string()),
            usage: Some(ApiUsage {
                input_tokens: 12,
                output_tokens: 34,
            }),
        };

        let parsed = provider().parse_response(response);
        assert_eq!(parsed.content, "Let me check.");
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.tool_calls[0].name, "read_file");
        assert_eq!(parsed.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(parsed.usage.map(|u| u.total()), Some(46));
    }

    #[test]
    fn test_parse_response_unknown_block_ignored() {
        let json = serde_json::json!({
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "answer"}
            ],
            "stop_reason": "end_turn"
        });
        let response: ApiResponse = serde_json::from_value(json).unwrap();
        let parsed = provider().parse_response(response);
        assert_eq!(parsed.content, "answer");
        assert!(parsed.tool_calls.is_empty());
    }

    #[test]
    fn test_api_message_from_blocks() {
        let message = Message::user_blocks(vec![ContentBlock::tool_result("tu_1", "ok", false)]);
        let api = ApiMessage::from(&message);
        assert_eq!(api.role, "user");
        assert_eq!(api.content[0]["type"], "tool_result");
    }
}
