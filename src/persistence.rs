//! Client-local state persistence
//!
//! Each store persists a whitelisted snapshot of itself as
//! `<storage_dir>/<key>.json`, wrapped in a small versioned envelope. Loading
//! never fails: a missing file yields the defaults silently, an unreadable or
//! corrupt one yields the defaults with a warning.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{DaoResult, StorageError};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 0;

/// On-disk wrapper around a store snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub state: T,
    #[serde(default)]
    pub version: u32,
}

/// A store whose durable subset can be saved and restored
pub trait Persist {
    /// Storage key, also the file stem
    const KEY: &'static str;

    /// Whitelisted durable fields
    type Snapshot: Serialize + DeserializeOwned + Default;

    fn snapshot(&self) -> Self::Snapshot;

    /// Replace the durable fields and recompute anything derived from them
    fn restore(&mut self, snapshot: Self::Snapshot);
}

/// Directory of per-store JSON snapshots
#[derive(Debug, Clone)]
pub struct StateStorage {
    dir: PathBuf,
}

impl StateStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Load a snapshot, falling back to `T::default()`
    pub fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(key, "No persisted state at {:?}", path);
                return T::default();
            }
            Err(e) => {
                tracing::warn!(key, "Failed to read persisted state {:?}: {}", path, e);
                return T::default();
            }
        };

        match serde_json::from_str::<Envelope<T>>(&content) {
            Ok(envelope) => {
                if envelope.version != SNAPSHOT_VERSION {
                    tracing::warn!(
                        key,
                        found = envelope.version,
                        expected = SNAPSHOT_VERSION,
                        "Snapshot version mismatch, using it anyway"
                    );
                }
                tracing::debug!(key, "Loaded persisted state from {:?}", path);
                envelope.state
            }
            Err(e) => {
                tracing::warn!(key, "Discarding corrupt snapshot {:?}: {}", path, e);
                T::default()
            }
        }
    }

    /// Write a snapshot, replacing the previous file atomically
    pub fn save<T: Serialize>(&self, key: &str, state: &T) -> DaoResult<()> {
        let storage_err = |e: &dyn std::fmt::Display| {
            StorageError::with_key(format!("{}: {}", self.path_for(key).display(), e), key)
        };

        std::fs::create_dir_all(&self.dir).map_err(|e| storage_err(&e))?;

        let envelope = Envelope {
            state,
            version: SNAPSHOT_VERSION,
        };
        let content = serde_json::to_string_pretty(&envelope).map_err(|e| storage_err(&e))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| storage_err(&e))?;
        std::fs::rename(&tmp, &path).map_err(|e| storage_err(&e))?;

        tracing::debug!(key, "Saved state to {:?}", path);
        Ok(())
    }

    /// Delete a snapshot; a missing file is not an error
    pub fn remove(&self, key: &str) -> DaoResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::with_key(e.to_string(), key).into()),
        }
    }

    pub fn load_into<S: Persist>(&self, store: &mut S) {
        store.restore(self.load::<S::Snapshot>(S::KEY));
    }

    pub fn save_from<S: Persist>(&self, store: &S) -> DaoResult<()> {
        self.save(S::KEY, &store.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let storage = StateStorage::new(dir.path());
        let loaded: Counter = storage.load("counter-storage");
        assert_eq!(loaded, Counter::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let storage = StateStorage::new(dir.path().join("nested"));
        storage.save("counter-storage", &Counter { value: 7 }).unwrap();

        let raw = std::fs::read_to_string(storage.path_for("counter-storage")).unwrap();
        assert!(raw.contains("\"state\""));
        assert!(raw.contains("\"version\": 0"));

        let loaded: Counter = storage.load("counter-storage");
        assert_eq!(loaded.value, 7);
    }

    #[test]
    fn test_corrupt_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let storage = StateStorage::new(dir.path());
        std::fs::write(storage.path_for("counter-storage"), "{not json").unwrap();
        let loaded: Counter = storage.load("counter-storage");
        assert_eq!(loaded, Counter::default());
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = StateStorage::new(dir.path());
        assert!(storage.remove("nothing-here").is_ok());
    }
}
