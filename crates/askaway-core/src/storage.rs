//! Named-slot persistence
//!
//! A `KeyValueStore` holds string values under fixed names, the way a browser's
//! local storage does. The history store sits on top of it, so tests can swap
//! the on-disk store for an in-memory one.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the slot has never been written or was removed
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent slot is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each slot as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.local/share/askaway` (or the platform equivalent)
    pub fn default_dir() -> Result<PathBuf, StorageError> {
        dirs::data_dir()
            .map(|p| p.join("askaway"))
            .ok_or_else(|| StorageError::Unavailable("could not determine data directory".to_string()))
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        // Write to a sibling file first so a crash never leaves a torn slot
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.slots
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_absent_slot_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("chatHistory").unwrap(), None);
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        store.set("chatHistory", "[]").unwrap();
        assert_eq!(store.get("chatHistory").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/chatHistory.json").exists());

        store.set("chatHistory", "[1]").unwrap();
        assert_eq!(store.get("chatHistory").unwrap().as_deref(), Some("[1]"));

        store.remove("chatHistory").unwrap();
        assert_eq!(store.get("chatHistory").unwrap(), None);
    }

    #[test]
    fn test_file_store_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.remove("chatHistory").unwrap();
        store.remove("chatHistory").unwrap();
    }

    #[test]
    fn test_memory_store_clones_share_slots() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
        other.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
