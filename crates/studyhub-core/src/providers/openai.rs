//! OpenAI Chat Completions provider

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

use super::types::{CompletionProvider, GenerationOptions, PromptMessage};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI provider. The request body carries the message sequence verbatim.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    /// No request timeout is configured: one attempt per call, and a stalled
    /// call is surfaced to the user as pending work rather than aborted.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the Chat Completions request body.
    fn request_body(
        model: &str,
        messages: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Value {
        serde_json::json!({
            "model": model,
            "messages": messages,
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
        })
    }

    /// Pull the first choice's message content out of a parsed response.
    fn extract_text(resp: ChatCompletionResponse) -> Result<String> {
        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                Error::UnexpectedResponse("OpenAI response had no choices".to_string())
            })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = Self::request_body(&self.model, messages, options);

        debug!(
            "OpenAI request: model={}, messages={}, max_tokens={}",
            self.model,
            messages.len(),
            options.max_tokens
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        Self::extract_text(parsed)
    }
}

// ── OpenAI wire types ──

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
