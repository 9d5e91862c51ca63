//! Durable key-value slots
//!
//! The store persists one JSON snapshot under one key. `SnapshotStorage` is
//! the seam between the store and the medium:
//!
//! - `FileStorage`: one `<key>.json` file per key inside a data directory,
//!   written through a temporary file and a rename
//! - `MemoryStorage`: an in-process map, with a switch that makes every write
//!   fail so the degraded path can be exercised

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::storage::error::{StorageError, StorageResult};

/// A key-value store holding serialized snapshots
pub trait SnapshotStorage: Send + Sync {
    /// Read the value under `key`, `None` if nothing was ever written
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write `value` under `key`, replacing any prior value
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// File-backed storage rooted at a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create storage in `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with one value
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.lock_slots().insert(key.to_string(), value.into());
        storage
    }

    /// Make every subsequent write and remove fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current raw value under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock_slots().get(key).cloned()
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds valid strings
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock_slots().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.lock_slots().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.lock_slots().remove(key);
        Ok(())
    }
}

impl<S: SnapshotStorage + ?Sized> SnapshotStorage for std::sync::Arc<S> {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert_eq!(storage.read("life-canvas-state").unwrap(), None);

        storage.write("life-canvas-state", r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(
            storage.read("life-canvas-state").unwrap().as_deref(),
            Some(r#"{"theme":"dark"}"#)
        );
        assert!(dir.path().join("life-canvas-state.json").exists());

        storage.write("life-canvas-state", "{}").unwrap();
        assert_eq!(storage.read("life-canvas-state").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_storage_remove() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.write("state", "{}").unwrap();
        storage.remove("state").unwrap();
        assert_eq!(storage.read("state").unwrap(), None);

        // Removing again is fine
        storage.remove("state").unwrap();
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert!(matches!(
            storage.write("../escape", "{}"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(storage.read("").is_err());
    }

    #[test]
    fn test_file_storage_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(&nested).unwrap();
        storage.write("state", "{}").unwrap();
        assert!(nested.join("state.json").exists());
    }

    #[test]
    fn test_memory_storage_failing_writes() {
        let storage = MemoryStorage::with_value("state", "old");
        storage.set_fail_writes(true);

        assert!(matches!(
            storage.write("state", "new"),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(storage.raw("state").as_deref(), Some("old"));
        assert_eq!(storage.read("state").unwrap().as_deref(), Some("old"));

        storage.set_fail_writes(false);
        storage.write("state", "new").unwrap();
        assert_eq!(storage.raw("state").as_deref(), Some("new"));
    }
}
