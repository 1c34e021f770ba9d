//! Google Gemini provider
//!
//! The Generative Language endpoint authenticates with the API key as a query
//! parameter, not an Authorization header. The conversation is flattened into
//! a single "{role}: {content}" text block; structured role separation is lost
//! on this path, a known fidelity limitation kept for compatibility with how
//! the service has always been driven.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

use super::types::{CompletionProvider, GenerationOptions, PromptMessage};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    /// No request timeout: one attempt per call, same as the OpenAI path.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Collapse the role-tagged sequence into one text block,
    /// "{role}: {content}" joined by blank lines.
    fn flatten_messages(messages: &[PromptMessage]) -> String {
        messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the generateContent request body.
    fn request_body(messages: &[PromptMessage], options: &GenerationOptions) -> Value {
        serde_json::json!({
            "contents": [{
                "parts": [{"text": Self::flatten_messages(messages)}]
            }],
            "generationConfig": {
                "maxOutputTokens": options.max_tokens,
                "temperature": options.temperature,
            },
        })
    }

    /// Pull the first candidate's first text part out of a parsed response.
    fn extract_text(resp: GenerateContentResponse) -> Result<String> {
        resp.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                Error::UnexpectedResponse("Gemini response had no candidates".to_string())
            })
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = Self::request_body(messages, options);

        debug!(
            "Gemini request: model={}, messages={}, max_tokens={}",
            self.model,
            messages.len(),
            options.max_tokens
        );

        let response = self
            .client
            .post(&url)
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

        let parsed: GenerateContentResponse = response.json().await?;
        Self::extract_text(parsed)
    }
}

// ── Gemini wire types ──

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}
