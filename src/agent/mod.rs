// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The agentic orchestration loop.
//!
//! One [`Agent`] drives a conversation: send the messages to the provider,
//! execute any tool calls it requests through the registry, feed the results
//! back, and repeat until the model answers in plain text or a cap is hit.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::AgentError;
use crate::tools::ToolRegistry;
use crate::types::{BoxedProvider, ContentBlock, Message, ProviderResponse, ToolCall, ToolResult};

/// Loop limits.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum provider round-trips per user prompt.
    pub max_iterations: u32,
    /// Consecutive provider failures tolerated before giving up.
    pub max_consecutive_errors: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            max_consecutive_errors: 3,
        }
    }
}

/// A tool-using conversation driver.
pub struct Agent {
    provider: BoxedProvider,
    tool_registry: Arc<ToolRegistry>,
    system_prompt: Option<String>,
    config: AgentConfig,
    messages: Vec<Message>,
}

impl Agent {
    pub fn new(
        provider: BoxedProvider,
        tool_registry: Arc<ToolRegistry>,
        system_prompt: Option<String>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            system_prompt,
            config,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Run one user prompt to completion and return the final answer text.
    pub async fn chat(&mut self, prompt: impl Into<String>) -> Result<String, AgentError> {
        self.messages.push(Message::user(prompt.into()));

        let definitions = if self.provider.supports_tool_use() {
            self.tool_registry.definitions()
        } else {
            Vec::new()
        };

        let mut consecutive_errors = 0u32;

        for iteration in 0..self.config.max_iterations {
            debug!(iteration, "agent loop iteration");

            let response = match self
                .provider
                .chat(&self.messages, &definitions, self.system_prompt.as_deref())
                .await
            {
                Ok(response) => {
                    consecutive_errors = 0;
                    response
                }
                Err(err) if err.is_retryable() => {
                    consecutive_errors += 1;
                    warn!(error = %err, consecutive_errors, "provider error");
                    if consecutive_errors >= self.config.max_consecutive_errors {
                        return Err(AgentError::MaxErrorsExceeded(consecutive_errors));
                    }
                    continue;
                }
                Err(err) => return Err(AgentError::Provider(err)),
            };

            if !response.has_tool_calls() {
                self.messages.push(Message::assistant(response.content.clone()));
                return Ok(response.content);
            }

            self.push_assistant_turn(&response);

            let mut results = Vec::new();
            for call in &response.tool_calls {
                results.push(self.execute_tool(call).await);
            }
            self.push_tool_results(results);
        }

        Err(AgentError::MaxIterationsExceeded(self.config.max_iterations))
    }

    /// Record the assistant's text and tool-use blocks.
    fn push_assistant_turn(&mut self, response: &ProviderResponse) {
        let mut blocks = Vec::new();
        if !response.content.is_empty() {
            blocks.push(ContentBlock::text(response.content.clone()));
        }
        for call in &response.tool_calls {
            blocks.push(ContentBlock::tool_use(
                call.id.clone(),
                call.name.clone(),
                call.input.clone(),
            ));
        }
        self.messages.push(Message::assistant_blocks(blocks));
    }

    /// Execute one tool call. Failures become error results for the model,
    /// never loop aborts.
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self
            .tool_registry
            .dispatch(&call.name, call.input.clone())
            .await
        {
            Ok(dispatch) => ToolResult {
                tool_use_id: call.id.clone(),
                content: dispatch.output.content(),
                is_error: dispatch.is_error(),
            },
            Err(err) => ToolResult {
                tool_use_id: call.id.clone(),
                content: err.to_string(),
                is_error: true,
            },
        }
    }

    fn push_tool_results(&mut self, results: Vec<ToolResult>) {
        let blocks = results
            .into_iter()
            .map(|result| {
                ContentBlock::tool_result(result.tool_use_id, result.content, result.is_error)
            })
            .collect();
        self.messages.push(Message::user_blocks(blocks));
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::ProviderError;
    use crate::tools::ToolRegistryBuilder;
    use crate::types::{Provider, ToolDefinition};

    /// Provider that requests a tool call a fixed number of times, then
    /// answers.
    struct ScriptedProvider {
        tool_turns: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn chat(
            &self,
            _messages: &[Message],
            _tools: &[ToolDefinition],
            _system_prompt: Option<&str>,
        ) -> Result<ProviderResponse, ProviderError> {
            let turn = self.calls.fetch_add(1, Ordering::SeqCst);
            if turn < self.tool_turns {
                Ok(ProviderResponse {
                    content: String::new(),
                    tool_calls: vec![ToolCall {
                        id: format!("tu_{turn}"),
                        name: "bash".to_string(),
                        input: serde_json::json!({"command": "echo hi"}),
                    }],
                    stop_reason: None,
                    usage: None,
                })
            } else {
                Ok(ProviderResponse {
                    content: "done".to_string(),
                    ..Default::default()
                })
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }
    }

    fn agent(tool_turns: u32, config: AgentConfig) -> Agent {
        Agent::new(
            Box::new(ScriptedProvider {
                tool_turns,
                calls: AtomicU32::new(0),
            }),
            Arc::new(ToolRegistryBuilder::new().with_defaults().build()),
            None,
            config,
        )
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let mut agent = agent(0, AgentConfig::default());
        let answer = agent.chat("hello").await.unwrap();
        assert_eq!(answer, "done");
        // user prompt + assistant answer
        assert_eq!(agent.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let mut agent = agent(1, AgentConfig::default());
        let answer = agent.chat("run it").await.unwrap();
        assert_eq!(answer, "done");
        // prompt, assistant tool_use, user tool_result, assistant answer
        assert_eq!(agent.messages().len(), 4);
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let config = AgentConfig {
            max_iterations: 3,
            ..Default::default()
        };
        // always asks for another tool call
        let mut agent = agent(u32::MAX, config);
        let err = agent.chat("loop").await.unwrap_err();
        assert!(matches!(err, AgentError::MaxIterationsExceeded(3)));
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_to_model() {
        struct BadToolProvider {
            calls: AtomicU32,
        }

        #[async_trait]
        impl Provider for BadToolProvider {
            async fn chat(
                &self,
                messages: &[Message],
                _tools: &[ToolDefinition],
                _system_prompt: Option<&str>,
            ) -> Result<ProviderResponse, ProviderError> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(ProviderResponse {
                        tool_calls: vec![ToolCall {
                            id: "tu_0".to_string(),
                            name: "no_such_tool".to_string(),
                            input: serde_json::json!({}),
                        }],
                        ..Default::default()
                    })
                } else {
                    // the error result must have come back in the messages
                    let last = messages.last().unwrap();
                    assert!(matches!(last.role, crate::types::Role::User));
                    Ok(ProviderResponse {
                        content: "recovered".to_string(),
                        ..Default::default()
                    })
                }
            }

            fn name(&self) -> &str {
                "bad-tool"
            }

            fn model(&self) -> &str {
                "bad-tool-1"
            }
        }

        let mut agent = Agent::new(
            Box::new(BadToolProvider {
                calls: AtomicU32::new(0),
            }),
            Arc::new(ToolRegistryBuilder::new().with_defaults().build()),
            None,
            AgentConfig::default(),
        );
        assert_eq!(agent.chat("go").await.unwrap(), "recovered");
    }
}
