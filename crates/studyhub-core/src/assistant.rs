//! Study operations layered on top of the gateway

use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::format;
use crate::gateway::Gateway;
use crate::prompts;
use crate::providers::GenerationOptions;

/// Options used by the content-generation call sites (summary, quiz,
/// flashcards). These override the gateway defaults and are forwarded to the
/// provider verbatim.
pub const STUDY_OPTIONS: GenerationOptions = GenerationOptions {
    max_tokens: 4000,
    temperature: 0.7,
};

/// Default number of quiz questions when the caller does not pick one.
pub const DEFAULT_QUIZ_QUESTIONS: usize = 5;

/// High-level study operations: each assembles a prompt, runs it through the
/// gateway, and formats the result for plain-text display.
pub struct StudyAssistant {
    gateway: Arc<Gateway>,
}

impl StudyAssistant {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Summarize `content`, labeled with a free-form `content_type`
    /// ("lecture", "article", "general", ...).
    pub async fn summarize(&self, content: &str, content_type: &str) -> Result<String> {
        require_content(content, "content")?;
        info!("Generating summary ({} chars of {})", content.len(), content_type);
        let raw = self
            .gateway
            .complete(&prompts::summary_prompt(content, content_type), &STUDY_OPTIONS)
            .await?;
        Ok(format::format_summary(&raw))
    }

    /// Generate `num_questions` multiple-choice questions from `content`.
    pub async fn quiz(&self, content: &str, num_questions: usize) -> Result<String> {
        require_content(content, "content")?;
        if num_questions == 0 {
            return Err(Error::InvalidInput(
                "num_questions must be at least 1".to_string(),
            ));
        }
        info!("Generating {} quiz questions", num_questions);
        let raw = self
            .gateway
            .complete(&prompts::quiz_prompt(content, num_questions), &STUDY_OPTIONS)
            .await?;
        Ok(format::format_mcq(&raw))
    }

    /// Generate flashcards from `content`.
    pub async fn flashcards(&self, content: &str) -> Result<String> {
        require_content(content, "content")?;
        info!("Generating flashcards");
        let raw = self
            .gateway
            .complete(&prompts::flashcard_prompt(content), &STUDY_OPTIONS)
            .await?;
        Ok(format::format_flashcards(&raw))
    }

    /// One chat turn with the study companion, using the gateway defaults
    /// (2000 tokens / 0.7) rather than the content-generation override.
    pub async fn chat(&self, message: &str) -> Result<String> {
        require_content(message, "message")?;
        self.gateway
            .complete(&prompts::chat_prompt(message), &GenerationOptions::default())
            .await
    }
}

/// Refuse to proceed on an empty required field, before any network call.
fn require_content(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayConfig;
    use crate::providers::mock::serve_once;
    use crate::session::{Provider, SessionStore};

    async fn assistant_with_openai_mock(base_url: String, dir: &std::path::Path) -> StudyAssistant {
        let sessions = Arc::new(SessionStore::open(dir));
        sessions.login("sk-test", Provider::OpenAi).await.unwrap();
        let config = GatewayConfig {
            openai_base_url: base_url,
            ..GatewayConfig::default()
        };
        StudyAssistant::new(Arc::new(Gateway::new(sessions, config)))
    }

    #[test]
    fn test_study_options_override_defaults() {
        assert_eq!(STUDY_OPTIONS.max_tokens, 4000);
        assert_eq!(STUDY_OPTIONS.temperature, 0.7);
    }

    #[tokio::test]
    async fn test_empty_content_rejected_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = Arc::new(SessionStore::open(dir.path()));
        sessions.login("sk-test", Provider::OpenAi).await.unwrap();
        let assistant =
            StudyAssistant::new(Arc::new(Gateway::new(sessions, GatewayConfig::default())));

        // No mock server is running; the input check fires first.
        assert!(matches!(
            assistant.summarize("   ", "general").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            assistant.chat("").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            assistant.quiz("content", 0).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_summarize_sends_override_options_and_formats() {
        let (base_url, request) = serve_once(
            200,
            r#"{"choices":[{"message":{"content":"**Key Points**\n- mitosis"}}]}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with_openai_mock(base_url, dir.path()).await;

        let summary = assistant.summarize("cells divide", "biology").await.unwrap();
        assert!(summary.contains("🔑 Key Points"));
        assert!(!summary.contains('*'));

        let captured = request.await.unwrap();
        assert!(captured.contains("\"max_tokens\":4000"));
        assert!(captured.contains("\"temperature\":0.7"));
    }

    #[tokio::test]
    async fn test_chat_uses_default_options() {
        let (base_url, request) = serve_once(
            200,
            r#"{"choices":[{"message":{"content":"hello studier!"}}]}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with_openai_mock(base_url, dir.path()).await;

        let reply = assistant.chat("hi").await.unwrap();
        assert_eq!(reply, "hello studier!");

        let captured = request.await.unwrap();
        assert!(captured.contains("\"max_tokens\":2000"));
    }

    #[tokio::test]
    async fn test_quiz_passes_question_count() {
        let (base_url, request) = serve_once(
            200,
            r#"{"choices":[{"message":{"content":"Q: what is x?\nAnswer: y"}}]}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with_openai_mock(base_url, dir.path()).await;

        let quiz = assistant.quiz("material", 3).await.unwrap();
        assert!(quiz.contains("❓ Question 1:"));

        let captured = request.await.unwrap();
        assert!(captured.contains("Create 3 fun multiple-choice"));
    }
}
