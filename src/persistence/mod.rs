//! Key-value persistence
//!
//! The game stores a handful of named values (balances, unlock lists,
//! settings, leaderboards). Back ends:
//! - `MemoryStore`: in-process map (tests, headless runs)
//! - `FileStore`: one JSON object on disk (native)
//! - `LocalStore`: browser LocalStorage (wasm32)
//!
//! Writes are synchronous and not transactional. Callers persisting at the
//! end of a session log failures instead of propagating them.

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
mod local;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage is unavailable")]
    Unavailable,
}

/// Named string values with no schema versioning
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Read a JSON value. Absent or unreadable entries yield `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable {key}: {e}");
            None
        }
    }
}

pub fn save_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Deserialize, Serialize)]
    struct Sample {
        a: u32,
        b: Vec<String>,
    }

    #[test]
    fn test_json_round_trip() {
        let mut store = MemoryStore::default();
        let value = Sample {
            a: 3,
            b: vec!["x".into()],
        };
        save_json(&mut store, "sample", &value).unwrap();
        assert_eq!(load_json::<Sample>(&store, "sample"), Some(value));
    }

    #[test]
    fn test_load_json_missing_or_corrupt() {
        let mut store = MemoryStore::default();
        assert_eq!(load_json::<Sample>(&store, "sample"), None);
        store.set("sample", "{ nope").unwrap();
        assert_eq!(load_json::<Sample>(&store, "sample"), None);
    }
}
