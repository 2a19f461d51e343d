//! Generic key-value storage with change notifications.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tokio::sync::broadcast;
use tracing::debug;

use chatpro_core::{Error, Result};

const CHANGE_CAPACITY: usize = 64;

/// A single key change, delivered to subscribers after a successful write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageChange {
    pub key: String,
    #[serde(rename = "oldValue")]
    pub old_value: Option<Value>,
    #[serde(rename = "newValue")]
    pub new_value: Value,
}

/// Storage capability shared by prompts and theme preference.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Receive every change made through this store after the call.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

// ---------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------

/// Process-local store, used outside the extension and in tests.
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            values: RwLock::new(HashMap::new()),
            changes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let old_value = self.values.write().insert(key.to_string(), value.clone());
        // No receivers is fine.
        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            old_value,
            new_value: value,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

// ---------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------

/// One JSON object on disk, re-read on every access.
///
/// Writes are read-modify-write of the whole file, serialized within the
/// instance. Each write goes to its own temp file and is renamed into place,
/// so readers always see a complete object. Between instances or processes
/// there is no locking: the last writer wins.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    changes: broadcast::Sender<StorageChange>,
}

impl JsonFileStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Ok(Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn persist(&self, map: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string_pretty(map)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut map = self.load()?;
        let old_value = map.insert(key.to_string(), value.clone());
        self.persist(&map)?;
        debug!("Stored key {} in {}", key, self.path.display());

        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            old_value,
            new_value: value,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("theme", json!("forest")).unwrap();
        assert_eq!(store.get("theme").unwrap(), Some(json!("forest")));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("a", json!([1, 2, 3])).unwrap();
        store.set("b", json!("x")).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("a").unwrap(), Some(json!([1, 2, 3])));
        assert_eq!(reopened.get("b").unwrap(), Some(json!("x")));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_concurrent_file_stores_never_tear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = JsonFileStore::open(&path).unwrap();
                    for i in 0..200 {
                        store.set(&format!("writer-{}", w), json!(i)).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("writer-0").is_ok());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_store_sees_external_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let first = JsonFileStore::open(&path).unwrap();
        let second = JsonFileStore::open(&path).unwrap();
        second.set("k", json!(7)).unwrap();

        assert_eq!(first.get("k").unwrap(), Some(json!(7)));
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(matches!(store.get("k"), Err(Error::Storage(_))));
    }

    #[test]
    fn test_empty_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[tokio::test]
    async fn test_change_notification() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        store.set("theme", json!("dim")).unwrap();
        store.set("theme", json!("forest")).unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.key, "theme");
        assert_eq!(first.old_value, None);
        assert_eq!(first.new_value, json!("dim"));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.old_value, Some(json!("dim")));
        assert_eq!(second.new_value, json!("forest"));
    }

    #[test]
    fn test_file_store_notifies_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(&dir.path().join("storage.json")).unwrap();
        let mut rx = store.subscribe();

        store.set("k", json!(true)).unwrap();
        let change = rx.try_recv().unwrap();
        assert_eq!(change.key, "k");
        assert_eq!(change.new_value, json!(true));
    }
}
