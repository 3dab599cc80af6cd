//! Key-value persistence for settings, best score and leaderboard
//!
//! Backends:
//! - `MemoryStore`: in-process map (tests, headless runs)
//! - `FileStore`: JSON file on disk (native)
//! - `LocalStore`: browser LocalStorage (wasm32)
//!
//! Storage is best-effort. Callers go through [`load_json`] / [`save_json`]
//! (or the raw trait with their own logging) so a broken store never reaches
//! gameplay.

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStore;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage keys (values are JSON-encoded)
pub mod keys {
    pub const BEST_SCORE: &str = "skyhop-best-score-v1";
    pub const SETTINGS: &str = "skyhop-settings-v1";
    pub const LEADERBOARD: &str = "skyhop-leaderboard-v1";
}

/// Failures a storage backend can report
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded writing `{key}`")]
    QuotaExceeded { key: String },
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed stored data: {0}")]
    Json(#[from] serde_json::Error),
}

/// A string key-value store
///
/// Methods take `&self`; backends use interior mutability so one store can be
/// shared between the settings and the score book.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Store handle shared by everything that persists
pub type SharedStore = Rc<dyn KeyValueStore>;

/// Read and decode a JSON value. Missing, unreadable or corrupt data is `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read `{}`: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring corrupt `{}`: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value. Returns false (after logging) on failure.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|json| store.set(key, &json));
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to save `{}`: {}", key, e);
            false
        }
    }
}

/// In-memory store
///
/// Can be switched read-only to exercise the failed-write paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    read_only: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a shared handle
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Reject all writes with `QuotaExceeded`
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only.get() {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
            });
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.read_only.get() {
            return Err(StorageError::Unavailable("store is read-only".to_string()));
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_through_store() {
        let store = MemoryStore::new();
        assert!(save_json(&store, "k", &vec![1u32, 2, 3]));
        let back: Option<Vec<u32>> = load_json(&store, "k");
        assert_eq!(back, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_missing_and_corrupt_values_load_as_none() {
        let store = MemoryStore::new();
        assert_eq!(load_json::<u32>(&store, "missing"), None);

        store.set("bad", "{not json").unwrap();
        assert_eq!(load_json::<u32>(&store, "bad"), None);
    }

    #[test]
    fn test_read_only_store_swallows_writes() {
        let store = MemoryStore::new();
        store.set_read_only(true);
        assert!(!save_json(&store, "k", &5u32));
        assert!(store.is_empty());
        assert!(matches!(
            store.set("k", "5"),
            Err(StorageError::QuotaExceeded { .. })
        ));
    }
}
