//! Prompt assembly for the study operations
//!
//! Each function returns the ordered message sequence handed to the gateway.
//! Content is truncated to a fixed length before prompting so a scraped page
//! or pasted chapter cannot blow past the provider's context window.

use crate::providers::PromptMessage;

/// Maximum characters of user content included in a prompt.
pub const MAX_CONTENT_CHARS: usize = 3000;

/// Shared instruction that keeps provider output renderable as plain text.
const PLAIN_TEXT_RULES: &str = "IMPORTANT: Use ONLY plain text. Do NOT use any formatting \
characters like asterisks (*), hashtags (#), dashes (---), underscores (_), or any markdown \
formatting. Write in simple, clean text with proper spacing and line breaks only.";

/// Messages for a structured summary of `content`.
pub fn summary_prompt(content: &str, content_type: &str) -> Vec<PromptMessage> {
    vec![
        PromptMessage::system(format!(
            "You are a cute and helpful academic tutor. Create adorable, structured summaries \
             with emojis and clear organization. Make it fun to read! {}",
            PLAIN_TEXT_RULES
        )),
        PromptMessage::user(format!(
            "Please summarize this {} content in a cute, organized way with emojis and clear \
             sections:\n\n{}",
            content_type,
            truncate(content)
        )),
    ]
}

/// Messages for `num_questions` multiple-choice questions over `content`.
pub fn quiz_prompt(content: &str, num_questions: usize) -> Vec<PromptMessage> {
    vec![
        PromptMessage::system(format!(
            "You are a fun quiz creator! Make engaging MCQs with cute explanations and emojis. \
             Make learning enjoyable! {}",
            PLAIN_TEXT_RULES
        )),
        PromptMessage::user(format!(
            "Create {} fun multiple-choice questions with 4 options each from this content. \
             Include cute explanations and emojis:\n\n{}",
            num_questions,
            truncate(content)
        )),
    ]
}

/// Messages for flashcards over `content`.
pub fn flashcard_prompt(content: &str) -> Vec<PromptMessage> {
    vec![
        PromptMessage::system(format!(
            "You are a cute study helper! Create adorable flashcards with clear questions and \
             answers. Make learning fun! {}",
            PLAIN_TEXT_RULES
        )),
        PromptMessage::user(format!(
            "Create flashcards from this content. Make them cute and educational:\n\n{}",
            truncate(content)
        )),
    ]
}

/// Messages for a single chat turn with the study companion.
pub fn chat_prompt(message: &str) -> Vec<PromptMessage> {
    vec![
        PromptMessage::system(format!(
            "You are a cute and helpful AI study companion. Be friendly, encouraging, and \
             helpful with academic topics. Use emojis and make learning fun! {}",
            PLAIN_TEXT_RULES
        )),
        PromptMessage::user(message),
    ]
}

/// Char-boundary-safe truncation to [`MAX_CONTENT_CHARS`].
fn truncate(content: &str) -> String {
    content.chars().take(MAX_CONTENT_CHARS).collect()
}
