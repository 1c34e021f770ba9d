//! LLM provider implementations and the shared completion trait

pub mod gemini;
pub mod openai;
pub mod types;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use types::{CompletionProvider, GenerationOptions, PromptMessage, Role};
