//! Persisted client state
//!
//! Small JSON documents keyed by name, the way the dashboard kept them in
//! browser storage. [`FileStore`] writes one `{key}.json` file per key;
//! [`MemoryStore`] is used by tests and ephemeral sessions.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Stock alerts with their user-set status
pub const ALERTS_KEY: &str = "cemac_alerts";
/// Today's sales tally
pub const DAILY_COUNTERS_KEY: &str = "cemac_daily_counters";
/// JAVI chat history
pub const CONVERSATION_KEY: &str = "javi_conversation";
/// Cached dashboard recommendations
pub const RECOMMENDATIONS_KEY: &str = "javi_recommendations";
/// Cached home screen recommendations
pub const HOME_RECOMMENDATIONS_KEY: &str = "javi_home_recommendations";

/// Raw key/value persistence
pub trait KeyValueStore: Send + Sync {
    fn get_raw(&self, key: &str) -> std::io::Result<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> std::io::Result<()>;
    fn remove(&self, key: &str) -> std::io::Result<()>;
}

/// Typed access on top of any [`KeyValueStore`]
pub trait KeyValueStoreExt {
    /// Read and decode a value; unreadable or corrupt entries read as `None`
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T>;

    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> std::io::Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.get_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored state");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding corrupt stored state");
                None
            }
        }
    }

    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> std::io::Result<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json)
    }
}

/// One JSON file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_raw(&self, key: &str) -> std::io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write to a sibling file first so a crash never leaves half a document
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> std::io::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> std::io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip_and_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state"));

        assert_eq!(store.get::<Vec<u32>>("nums"), None);
        store.set("nums", &vec![1u32, 2, 3]).unwrap();
        assert_eq!(store.get::<Vec<u32>>("nums"), Some(vec![1, 2, 3]));

        store.set_raw("nums", "{not json").unwrap();
        assert_eq!(store.get::<Vec<u32>>("nums"), None);

        store.remove("nums").unwrap();
        store.remove("nums").unwrap();
        assert!(store.get_raw("nums").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_through_trait_object() {
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set(DAILY_COUNTERS_KEY, "x").unwrap();
        assert_eq!(store.get::<String>(DAILY_COUNTERS_KEY).as_deref(), Some("x"));
    }
}
