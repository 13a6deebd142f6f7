//! Key-value blob stores for persisted UI state

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Minimal string blob store (localStorage-like)
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as a JSON file inside a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`; characters unsafe in file names become `_`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(path).map(Some)
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a crash never leaves a truncated blob
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(tmp, path)
    }
}

/// In-memory store, used when no directory is configured
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested"));

        assert_eq!(store.get("oko:ui").unwrap(), None);
        store.set("oko:ui", "{\"a\":1}").unwrap();
        store.set("oko:ui", "{\"a\":2}").unwrap();
        assert_eq!(store.get("oko:ui").unwrap().as_deref(), Some("{\"a\":2}"));
    }

    #[test]
    fn test_path_sanitized() {
        let store = FileKeyValueStore::new("/tmp/oko");
        let path = store.path_for("oko:dashboard-ui-state:v1");
        assert_eq!(path, PathBuf::from("/tmp/oko/oko_dashboard-ui-state_v1.json"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryKeyValueStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
