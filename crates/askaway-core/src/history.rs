//! Persisted history of past exchanges.
//!
//! The whole list lives in a single slot as a JSON array, newest first.

use crate::error::StorageError;
use crate::state::HistoryEntry;
use crate::storage::KeyValueStore;

/// Slot name holding the history list
pub const HISTORY_KEY: &str = "chatHistory";

pub struct HistoryStore {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl HistoryStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            key: HISTORY_KEY.to_string(),
        }
    }

    /// Returns the persisted list, or the bundled defaults when the slot is
    /// absent, unreadable, or does not parse.
    pub fn load(&self) -> Vec<HistoryEntry> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default_history(),
            Err(e) => {
                tracing::warn!("Failed to read history slot '{}': {}", self.key, e);
                return default_history();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Loaded chat history");
                entries
            }
            Err(e) => {
                tracing::warn!("Ignoring unparseable history slot '{}': {}", self.key, e);
                default_history()
            }
        }
    }

    /// Overwrites the slot with the full list
    pub fn save(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;
        self.store.set(&self.key, &json)
    }

    /// Removes the slot. The next `load` falls back to the defaults.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key)
    }
}

/// Example exchanges shown before anything has been persisted
pub fn default_history() -> Vec<HistoryEntry> {
    vec![
        HistoryEntry {
            id: "example-3".to_string(),
            query: "Which documents mention the onboarding checklist?".to_string(),
            response: "The onboarding checklist appears in the employee handbook (section 2) and in the IT setup guide, which links to it from its introduction.".to_string(),
            sources: vec!["employee-handbook.pdf".to_string(), "it-setup-guide.pdf".to_string()],
            timestamp: "2025-06-03T14:20:00Z".to_string(),
        },
        HistoryEntry {
            id: "example-2".to_string(),
            query: "Summarize the uploaded quarterly report.".to_string(),
            response: "Revenue grew 12% over the previous quarter, driven mainly by subscription renewals. Operating costs stayed flat and two new regional offices opened.".to_string(),
            sources: vec!["q2-report.pdf".to_string()],
            timestamp: "2025-06-02T09:45:00Z".to_string(),
        },
        HistoryEntry {
            id: "example-1".to_string(),
            query: "What is AskAway?".to_string(),
            response: "AskAway answers questions about your uploaded documents. Ask anything and it will cite the documents it used.".to_string(),
            sources: vec!["doc1.pdf".to_string(), "example.com".to_string()],
            timestamp: "2025-06-01T08:00:00Z".to_string(),
        },
    ]
}
