//! In-memory study data: notes, events, and chat history
//!
//! Entities exist until the user removes them; there are no other persistence
//! invariants. A JSON snapshot can be saved and restored so a restart does not
//! wipe the lists.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// File name of the JSON snapshot inside the data dir.
pub const STORE_FILE: &str = "study_data.json";

/// A study note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scheduled study event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Free-form date string as entered by the user (the UI owns the format).
    pub date: String,
    pub duration_minutes: u32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// One chat exchange with the study companion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub user: String,
    pub assistant: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoreData {
    notes: Vec<Note>,
    events: Vec<StudyEvent>,
    chat_history: Vec<ChatEntry>,
}

/// Thread-safe holder for all transient study data.
pub struct StudyStore {
    data: RwLock<StoreData>,
}

impl StudyStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(StoreData::default()),
        }
    }

    /// Restore a snapshot if one exists at `data_dir`, otherwise start empty.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(STORE_FILE);
        let data = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(data) => {
                    debug!("Restored study data from {}", path.display());
                    data
                }
                Err(e) => {
                    debug!("Ignoring unreadable snapshot {}: {}", path.display(), e);
                    StoreData::default()
                }
            },
            Err(_) => StoreData::default(),
        };
        Self {
            data: RwLock::new(data),
        }
    }

    /// Write the current snapshot under `data_dir`.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(STORE_FILE);
        let data = self.data.read().await;
        std::fs::write(&path, serde_json::to_string_pretty(&*data)?)?;
        debug!("Saved study data to {}", path.display());
        Ok(())
    }

    // ── Notes ──

    pub async fn add_note(&self, title: &str, content: &str, tags: Vec<String>) -> Result<Note> {
        if title.trim().is_empty() {
            return Err(Error::InvalidInput("note title must not be empty".to_string()));
        }
        let now = Utc::now();
        let note = Note {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            tags,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.notes.push(note.clone());
        info!("Added note '{}'", note.title);
        Ok(note)
    }

    pub async fn update_note(
        &self,
        id: &str,
        title: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<Note> {
        let mut data = self.data.write().await;
        let note = data
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("note {}", id)))?;
        note.title = title.to_string();
        note.content = content.to_string();
        note.tags = tags;
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    /// Removing an id that is already gone is not an error.
    pub async fn delete_note(&self, id: &str) {
        let mut data = self.data.write().await;
        data.notes.retain(|n| n.id != id);
    }

    pub async fn notes(&self) -> Vec<Note> {
        self.data.read().await.notes.clone()
    }

    // ── Events ──

    pub async fn add_event(
        &self,
        title: &str,
        description: &str,
        date: &str,
        duration_minutes: u32,
    ) -> Result<StudyEvent> {
        if title.trim().is_empty() {
            return Err(Error::InvalidInput("event title must not be empty".to_string()));
        }
        let event = StudyEvent {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            date: date.to_string(),
            duration_minutes,
            completed: false,
            created_at: Utc::now(),
        };
        self.data.write().await.events.push(event.clone());
        info!("Added event '{}'", event.title);
        Ok(event)
    }

    pub async fn update_event(
        &self,
        id: &str,
        title: &str,
        description: &str,
        date: &str,
        duration_minutes: u32,
    ) -> Result<StudyEvent> {
        let mut data = self.data.write().await;
        let event = data
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("event {}", id)))?;
        event.title = title.to_string();
        event.description = description.to_string();
        event.date = date.to_string();
        event.duration_minutes = duration_minutes;
        Ok(event.clone())
    }

    pub async fn delete_event(&self, id: &str) {
        let mut data = self.data.write().await;
        data.events.retain(|e| e.id != id);
    }

    pub async fn events(&self) -> Vec<StudyEvent> {
        self.data.read().await.events.clone()
    }

    // ── Chat history ──

    pub async fn append_chat(&self, user: &str, assistant: &str) -> ChatEntry {
        let entry = ChatEntry {
            user: user.to_string(),
            assistant: assistant.to_string(),
            timestamp: Utc::now(),
        };
        self.data.write().await.chat_history.push(entry.clone());
        entry
    }

    pub async fn chat_history(&self) -> Vec<ChatEntry> {
        self.data.read().await.chat_history.clone()
    }
}

impl Default for StudyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_note_crud() {
        let store = StudyStore::new();
        let note = store
            .add_note("Mitosis", "cells divide", vec!["bio".to_string()])
            .await
            .unwrap();
        assert_eq!(store.notes().await.len(), 1);

        let updated = store
            .update_note(&note.id, "Mitosis II", "cells divide twice", vec![])
            .await
            .unwrap();
        assert_eq!(updated.title, "Mitosis II");
        assert!(updated.updated_at >= note.updated_at);

        store.delete_note(&note.id).await;
        assert!(store.notes().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_note_empty_title_rejected() {
        let store = StudyStore::new();
        assert!(matches!(
            store.add_note(" ", "content", vec![]).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_note_is_not_found() {
        let store = StudyStore::new();
        assert!(matches!(
            store.update_note("nope", "t", "c", vec![]).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_note_is_ok() {
        let store = StudyStore::new();
        store.delete_note("nope").await;
    }

    #[tokio::test]
    async fn test_event_crud() {
        let store = StudyStore::new();
        let event = store
            .add_event("Exam prep", "chapters 1-3", "2026-09-15", 90)
            .await
            .unwrap();
        assert!(!event.completed);

        let updated = store
            .update_event(&event.id, "Exam prep", "chapters 1-4", "2026-09-16", 120)
            .await
            .unwrap();
        assert_eq!(updated.duration_minutes, 120);

        store.delete_event(&event.id).await;
        assert!(store.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_chat_history_appends_in_order() {
        let store = StudyStore::new();
        store.append_chat("hi", "hello!").await;
        store.append_chat("what is osmosis?", "water diffusion").await;
        let history = store.chat_history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user, "hi");
        assert_eq!(history[1].assistant, "water diffusion");
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = StudyStore::new();
        store.add_note("Mitosis", "cells divide", vec![]).await.unwrap();
        store
            .add_event("Review", "flashcards", "2026-09-01", 30)
            .await
            .unwrap();
        store.save(dir.path()).await.unwrap();

        let restored = StudyStore::load(dir.path());
        assert_eq!(restored.notes().await.len(), 1);
        assert_eq!(restored.events().await.len(), 1);
        assert_eq!(restored.notes().await[0].title, "Mitosis");
    }

    #[tokio::test]
    async fn test_load_missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StudyStore::load(dir.path());
        assert!(store.notes().await.is_empty());
    }
}
