//! Login session: the credential/provider pair the user is acting as.
//!
//! Exactly one session is active at a time. It is created on login, persisted
//! as JSON under a fixed file name so it survives restarts, and destroyed on
//! logout.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Fixed file name the session record is stored under, inside the data dir.
pub const SESSION_FILE: &str = "session.json";

/// Which LLM vendor a session talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(Error::InvalidInput(format!(
                "unknown provider '{}' (expected 'openai' or 'gemini')",
                other
            ))),
        }
    }
}

/// The active credential/provider pairing
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    pub api_key: String,
    pub provider: Provider,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_key", &mask_secret(&self.api_key))
            .field("provider", &self.provider)
            .finish()
    }
}

/// Holds the active session and mirrors it to disk.
pub struct SessionStore {
    path: PathBuf,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Open a store rooted at `data_dir`, loading a persisted session if one
    /// exists. A corrupt session file is discarded rather than blocking login.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(SESSION_FILE);
        let current = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => {
                    debug!("Restored {} session from {}", session.provider, path.display());
                    Some(session)
                }
                Err(e) => {
                    debug!("Ignoring unreadable session file {}: {}", path.display(), e);
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    /// Create a session from the given credentials and persist it.
    pub async fn login(&self, api_key: &str, provider: Provider) -> Result<Session> {
        if api_key.trim().is_empty() {
            return Err(Error::InvalidInput("api_key must not be empty".to_string()));
        }
        let session = Session {
            api_key: api_key.trim().to_string(),
            provider,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&session)?)?;

        let mut current = self.current.write().await;
        *current = Some(session.clone());
        info!("Logged in with provider {}", provider);
        Ok(session)
    }

    /// Destroy the active session and remove the persisted record.
    pub async fn logout(&self) -> Result<()> {
        let mut current = self.current.write().await;
        if current.take().is_some() {
            info!("Logged out");
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// The active session, if any.
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }
}

/// Mask a secret for safe display in Debug output / logs.
/// Shows first 3 and last 4 chars for keys longer than 7 chars, otherwise "***".
fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "(empty)".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 7 {
        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_roundtrip() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("Gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert!("claude".parse::<Provider>().is_err());
        assert_eq!(Provider::OpenAi.to_string(), "openai");
    }

    #[test]
    fn test_provider_serde_lowercase() {
        let json = serde_json::to_string(&Provider::Gemini).unwrap();
        assert_eq!(json, "\"gemini\"");
        let back: Provider = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(back, Provider::OpenAi);
    }

    #[tokio::test]
    async fn test_login_persists_and_logout_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        assert!(store.current().await.is_none());

        store.login("sk-test-key", Provider::OpenAi).await.unwrap();
        assert!(dir.path().join(SESSION_FILE).exists());

        // A fresh store picks the session back up from disk
        let reopened = SessionStore::open(dir.path());
        let session = reopened.current().await.unwrap();
        assert_eq!(session.api_key, "sk-test-key");
        assert_eq!(session.provider, Provider::OpenAi);

        reopened.logout().await.unwrap();
        assert!(reopened.current().await.is_none());
        assert!(!dir.path().join(SESSION_FILE).exists());
    }

    #[tokio::test]
    async fn test_login_rejects_empty_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        let err = store.login("   ", Provider::Gemini).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_logout_without_session_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        store.logout().await.unwrap();
    }

    #[test]
    fn test_session_debug_hides_key() {
        let session = Session {
            api_key: "sk-super-secret-key".to_string(),
            provider: Provider::OpenAi,
        };
        let debug = format!("{:?}", session);
        assert!(!debug.contains("sk-super-secret-key"));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(empty)");
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret("sk-1234567890"), "sk-...7890");
    }
}
