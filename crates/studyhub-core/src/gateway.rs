//! LLM gateway: resolves the active session and dispatches to its provider.
//!
//! The gateway is a stateless request/response shim. It makes exactly one
//! attempt per call: no retry, no backoff, no caching, and identical prompts
//! re-issue identical network calls.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::providers::{
    CompletionProvider, GeminiProvider, GenerationOptions, OpenAiProvider, PromptMessage,
};
use crate::session::{Provider, Session, SessionStore};

/// Model and endpoint settings, one entry per provider.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub openai_model: String,
    pub openai_base_url: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_base_url: crate::providers::openai::DEFAULT_OPENAI_BASE_URL.to_string(),
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_base_url: crate::providers::gemini::DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

/// Dispatches completion requests to the provider named by the active session.
pub struct Gateway {
    sessions: Arc<SessionStore>,
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(sessions: Arc<SessionStore>, config: GatewayConfig) -> Self {
        Self { sessions, config }
    }

    /// Forward the conversation to the active session's provider and return
    /// the normalized text. Fails with `Error::Authentication` before any
    /// network activity when no session is active.
    pub async fn complete(
        &self,
        messages: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String> {
        let session = self.sessions.current().await.ok_or(Error::Authentication)?;
        let provider = self.provider_for(&session);
        debug!(
            "Dispatching {} messages to {} ({})",
            messages.len(),
            provider.name(),
            provider.model()
        );
        provider.complete(messages, options).await
    }

    /// The provider tag of the active session, if any.
    pub async fn active_provider(&self) -> Option<Provider> {
        self.sessions.current().await.map(|s| s.provider)
    }

    fn provider_for(&self, session: &Session) -> Box<dyn CompletionProvider> {
        match session.provider {
            Provider::OpenAi => Box::new(
                OpenAiProvider::new(session.api_key.clone(), self.config.openai_model.clone())
                    .with_base_url(self.config.openai_base_url.clone()),
            ),
            Provider::Gemini => Box::new(
                GeminiProvider::new(session.api_key.clone(), self.config.gemini_model.clone())
                    .with_base_url(self.config.gemini_base_url.clone()),
            ),
        }
    }
}
