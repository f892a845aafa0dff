//! Durable local key-value stores
//!
//! Two [`KeyValueStore`] implementations: an in-memory map for tests and
//! short-lived sessions, and a directory-of-files store that plays the role
//! localStorage plays in the browser frontend.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::CartError;
use crate::traits::KeyValueStore;

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CartError> {
        let entries = self.entries.lock().map_err(|_| CartError::LockError)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CartError> {
        let mut entries = self.entries.lock().map_err(|_| CartError::LockError)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CartError> {
        let mut entries = self.entries.lock().map_err(|_| CartError::LockError)?;
        entries.remove(key);
        Ok(())
    }
}

/// File-backed key-value store: one file per key under a directory.
///
/// Keys must be simple names (no path separators); they map to
/// `<dir>/<key>.json`.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CartError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| CartError::Persistence(format!("create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CartError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(CartError::Persistence(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Directory the store writes under.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CartError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CartError::Persistence(format!("read {}: {e}", path.display()))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CartError> {
        let path = self.path_for(key)?;
        // write-then-rename so readers never observe a torn value
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .map_err(|e| CartError::Persistence(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| CartError::Persistence(format!("rename {}: {e}", path.display())))
    }

    fn remove(&self, key: &str) -> Result<(), CartError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CartError::Persistence(format!("remove {}: {e}", path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();

        assert_eq!(store.get("cart").expect("get"), None);
        store.set("cart", "{}").expect("set");
        assert_eq!(store.get("cart").expect("get"), Some("{}".to_string()));
        store.remove("cart").expect("remove");
        assert_eq!(store.get("cart").expect("get"), None);
    }

    #[test]
    fn test_memory_store_remove_absent_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("missing").is_ok());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path()).expect("open");

        store.set("cart", r#"{"1":{"quantity":2}}"#).expect("set");
        assert_eq!(
            store.get("cart").expect("get"),
            Some(r#"{"1":{"quantity":2}}"#.to_string())
        );

        store.remove("cart").expect("remove");
        assert_eq!(store.get("cart").expect("get"), None);
        assert!(store.remove("cart").is_ok());
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path()).expect("open");

        store.set("cart", "one").expect("first");
        store.set("cart", "two").expect("second");
        assert_eq!(store.get("cart").expect("get"), Some("two".to_string()));
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path()).expect("open");

        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("a/b").is_err());
    }
}
