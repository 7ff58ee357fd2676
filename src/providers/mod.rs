// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! LLM provider implementations.

pub mod anthropic;

pub use anthropic::AnthropicProvider;

use std::str::FromStr;

use crate::error::ProviderError;
use crate::types::{BoxedProvider, ProviderConfig};

/// Known provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Anthropic,
}

impl ProviderType {
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    pub fn env_api_key(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl FromStr for ProviderType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }
}

/// Construct a provider from its type and configuration.
///
/// The API key comes from the config when set, otherwise from the
/// provider's environment variable.
pub fn create_provider(
    provider_type: ProviderType,
    config: ProviderConfig,
) -> Result<BoxedProvider, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .or_else(|| std::env::var(provider_type.env_api_key()).ok())
        .ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "no API key; set {} or configure api_key",
                provider_type.env_api_key()
            ))
        })?;

    match provider_type {
        ProviderType::Anthropic => Ok(Box::new(AnthropicProvider::new(api_key, config))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_from_str() {
        assert_eq!(
            "anthropic".parse::<ProviderType>().unwrap(),
            ProviderType::Anthropic
        );
        assert_eq!(
            "Claude".parse::<ProviderType>().unwrap(),
            ProviderType::Anthropic
        );
        assert!("unknown".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_default_model() {
        assert!(ProviderType::Anthropic.default_model().starts_with("claude"));
    }

    #[test]
    fn test_create_provider_with_config_key() {
        let provider = create_provider(
            ProviderType::Anthropic,
            ProviderConfig {
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(provider.name(), "anthropic");
    }
}
