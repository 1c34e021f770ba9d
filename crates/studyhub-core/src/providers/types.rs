//! Provider-agnostic prompt types for the completion gateway

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One role-tagged turn in a conversation. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Generation knobs forwarded verbatim to the provider's endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl GenerationOptions {
    pub fn new(max_tokens: u32, temperature: f64) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}

/// Trait implemented once per LLM vendor.
///
/// One attempt per call: implementations do not retry, back off, or cache.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai", "gemini")
    fn name(&self) -> &str;

    /// Model identifier (e.g. "gpt-3.5-turbo", "gemini-2.5-flash")
    fn model(&self) -> &str;

    /// Send the conversation and return the normalized text result.
    async fn complete(
        &self,
        messages: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let msg = PromptMessage::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
    }

    #[test]
    fn test_default_options() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.max_tokens, 2000);
        assert_eq!(opts.temperature, 0.7);
    }

    #[test]
    fn test_constructors() {
        assert_eq!(PromptMessage::system("s").role, Role::System);
        assert_eq!(PromptMessage::assistant("a").role, Role::Assistant);
    }
}
