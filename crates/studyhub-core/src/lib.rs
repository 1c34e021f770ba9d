//! studyhub-core - The brain of the study hub
//!
//! This crate provides:
//! - Provider-agnostic completion gateway over OpenAI and Gemini
//! - Study assistant operations: summaries, quizzes, flashcards, and chat
//! - Web page scraping for study material
//! - Plain-text formatting of model output with friendly markers
//! - Session handling and the notes/events/chat store

pub mod assistant;
pub mod error;
pub mod format;
pub mod gateway;
pub mod prompts;
pub mod providers;
pub mod scrape;
pub mod session;
pub mod store;

// Re-export main types for convenience
pub use assistant::{StudyAssistant, DEFAULT_QUIZ_QUESTIONS, STUDY_OPTIONS};
pub use error::{Error, Result};
pub use gateway::{Gateway, GatewayConfig};
pub use providers::{
    CompletionProvider, GeminiProvider, GenerationOptions, OpenAiProvider, PromptMessage, Role,
};
pub use scrape::{ScrapeResult, Scraper};
pub use session::{Provider, Session, SessionStore};
pub use store::{ChatEntry, Note, StudyEvent, StudyStore};
