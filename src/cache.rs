//! Geocode cache backends.
//!
//! Both backends compare keys case-insensitively and keep entries forever:
//! a resolved query is treated as permanently valid, so there is no TTL and
//! no eviction. Callers that want a retention policy rotate the backing file
//! themselves.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::traits::CoordinateStore;

/// Unbounded in-process store; contents die with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (f64, f64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CoordinateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<(f64, f64)> {
        let entries = self.entries.lock().ok()?;
        entries.get(&key.to_lowercase()).copied()
    }

    fn put(&self, key: &str, coords: (f64, f64)) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_lowercase(), coords);
        }
    }
}

/// Durable store backed by a single JSON file, surviving process restarts.
///
/// Every put rewrites the whole file; concurrent writers race last-write-wins,
/// which is acceptable because values for a given key are identical. A
/// missing or unreadable file on open is an empty cache, not an error.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, (f64, f64)>>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    fn persist(&self, entries: &HashMap<String, (f64, f64)>) {
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to serialize geocode cache");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %err, "failed to persist geocode cache");
        }
    }
}

fn load_entries(path: &Path) -> HashMap<String, (f64, f64)> {
    let Ok(raw) = fs::read_to_string(path) else {
        return HashMap::new();
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring corrupt geocode cache file");
            HashMap::new()
        }
    }
}

impl CoordinateStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<(f64, f64)> {
        let entries = self.entries.lock().ok()?;
        entries.get(&key.to_lowercase()).copied()
    }

    fn put(&self, key: &str, coords: (f64, f64)) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_lowercase(), coords);
            self.persist(&entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("calle mayor 3, illescas").is_none());
        store.put("calle mayor 3, illescas", (40.12, -3.85));
        assert_eq!(store.get("calle mayor 3, illescas"), Some((40.12, -3.85)));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let store = MemoryStore::new();
        store.put("Calle Mayor 3, Illescas, Toledo, Spain", (40.12, -3.85));
        assert_eq!(
            store.get("calle mayor 3, illescas, toledo, spain"),
            Some((40.12, -3.85))
        );
        assert_eq!(
            store.get("CALLE MAYOR 3, ILLESCAS, TOLEDO, SPAIN"),
            Some((40.12, -3.85))
        );
    }

    #[test]
    fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("k", (1.0, 2.0));
        store.put("k", (3.0, 4.0));
        assert_eq!(store.get("k"), Some((3.0, 4.0)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geocode_cache.json");

        let store = JsonFileStore::open(&path);
        store.put("Illescas, Toledo, Spain", (40.1228, -3.8482));
        drop(store);

        let reopened = JsonFileStore::open(&path);
        assert_eq!(
            reopened.get("illescas, toledo, spain"),
            Some((40.1228, -3.8482))
        );
    }

    #[test]
    fn test_missing_file_is_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("nope.json"));
        assert_eq!(store.len(), 0);
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn test_corrupt_file_is_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geocode_cache.json");
        fs::write(&path, "not json{").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.len(), 0);

        // A put after the corrupt load still persists cleanly.
        store.put("k", (1.0, 2.0));
        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("k"), Some((1.0, 2.0)));
    }
}
