//! Error taxonomy shared across the study hub

use thiserror::Error;

/// Convenience alias used throughout the core crate
pub type Result<T> = std::result::Result<T, Error>;

/// All failure modes a caller can observe.
///
/// None of these are fatal: callers render them (HTTP status + JSON, or a CLI
/// message) and the user is free to retry the action.
#[derive(Debug, Error)]
pub enum Error {
    /// No active session. Raised before any network call is made.
    #[error("not logged in: no active session")]
    Authentication,

    /// The LLM provider answered with a non-2xx status.
    #[error("provider request failed with status {status}: {message}")]
    Provider { status: u16, message: String },

    /// Transport-level failure (DNS, connect, read, JSON decode of the body).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body did not carry the expected fields.
    #[error("provider returned an unusable response: {0}")]
    UnexpectedResponse(String),

    /// Empty or malformed caller input, rejected before doing any work.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A note or event id that does not exist in the store.
    #[error("{0} not found")]
    NotFound(String),

    /// Reading or writing the session file / data snapshot failed.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// JSON (de)serialization of persisted state failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_carries_status() {
        let err = Error::Provider {
            status: 429,
            message: "rate limited".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("rate limited"));
    }

    #[test]
    fn test_authentication_error_message() {
        assert!(Error::Authentication.to_string().contains("no active session"));
    }

    #[test]
    fn test_not_found_message() {
        let err = Error::NotFound("note abc".to_string());
        assert_eq!(err.to_string(), "note abc not found");
    }
}
