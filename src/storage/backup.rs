//! Snapshot backups
//!
//! Each backup is a zip archive holding the snapshot (`state.json`) and a
//! small `metadata.json`. Archives older than the retention window are
//! pruned on demand.
//!
//! ```text
//! backups/
//!   backup_20250114_213000.zip
//!     ├── state.json
//!     └── metadata.json
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

use crate::state::AppState;
use crate::storage::error::{StorageError, StorageResult};

const SNAPSHOT_ENTRY: &str = "state.json";
const METADATA_ENTRY: &str = "metadata.json";

/// Metadata stored inside each archive
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupMetadata {
    pub backup_name: String,
    pub created_at: DateTime<Utc>,
    /// Size of `state.json` in bytes
    pub snapshot_size: u64,
}

/// A backup archive on disk
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BackupInfo {
    /// File name, e.g. `backup_20250114_213000.zip`
    pub name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    /// Archive size in bytes
    pub size_bytes: u64,
}

/// Creates, lists, reads and prunes snapshot backups
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    retention_days: u32,
}

impl BackupManager {
    /// Create a manager for `dir`, creating it if needed
    pub fn new(dir: impl Into<PathBuf>, retention_days: u32) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            retention_days,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Archive the given state now
    pub fn create(&self, state: &AppState) -> StorageResult<BackupInfo> {
        self.create_at(state, Utc::now())
    }

    /// Archive the given state, stamped with `now`
    pub fn create_at(&self, state: &AppState, now: DateTime<Utc>) -> StorageResult<BackupInfo> {
        let snapshot = serde_json::to_string_pretty(state)?;
        let name = self.unique_name(now);
        let path = self.dir.join(&name);

        let metadata = BackupMetadata {
            backup_name: name.clone(),
            created_at: now,
            snapshot_size: snapshot.len() as u64,
        };

        let file = File::create(&path)?;
        let mut writer = zip::ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        writer.start_file(SNAPSHOT_ENTRY, options)?;
        writer.write_all(snapshot.as_bytes())?;
        writer.start_file(METADATA_ENTRY, options)?;
        writer.write_all(serde_json::to_string_pretty(&metadata)?.as_bytes())?;
        writer.finish()?;

        let size_bytes = std::fs::metadata(&path)?.len();
        tracing::info!(backup = %name, size_bytes, "Backup created");

        Ok(BackupInfo {
            name,
            path,
            created_at: now,
            size_bytes,
        })
    }

    /// All backups, newest first
    ///
    /// Archives that cannot be opened are skipped with a warning.
    pub fn list(&self) -> StorageResult<Vec<BackupInfo>> {
        let mut backups = Vec::new();

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !is_backup_name(&name) {
                continue;
            }

            let path = entry.path();
            match read_metadata(&path) {
                Ok(metadata) => backups.push(BackupInfo {
                    name,
                    created_at: metadata.created_at,
                    size_bytes: entry.metadata()?.len(),
                    path,
                }),
                Err(e) => {
                    tracing::warn!(backup = %name, error = %e, "Skipping unreadable backup");
                }
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.name.cmp(&a.name)));
        Ok(backups)
    }

    /// Snapshot text stored in the named backup
    pub fn read_snapshot(&self, name: &str) -> StorageResult<String> {
        if !is_backup_name(name) || name.contains('/') || name.contains('\\') || name.contains("..")
        {
            return Err(StorageError::BackupNotFound(name.to_string()));
        }

        let path = self.dir.join(name);
        if !path.exists() {
            return Err(StorageError::BackupNotFound(name.to_string()));
        }

        let mut archive = zip::ZipArchive::new(File::open(&path)?)?;
        let mut entry = archive.by_name(SNAPSHOT_ENTRY)?;
        let mut snapshot = String::new();
        entry.read_to_string(&mut snapshot)?;
        Ok(snapshot)
    }

    /// Delete backups older than the retention window
    ///
    /// Returns how many archives were removed.
    pub fn prune(&self, now: DateTime<Utc>) -> StorageResult<usize> {
        let cutoff = now - Duration::days(self.retention_days as i64);
        let mut removed = 0;

        for backup in self.list()? {
            if backup.created_at < cutoff {
                std::fs::remove_file(&backup.path)?;
                tracing::info!(backup = %backup.name, "Pruned expired backup");
                removed += 1;
            }
        }

        Ok(removed)
    }

    fn unique_name(&self, now: DateTime<Utc>) -> String {
        let stem = format!("backup_{}", now.format("%Y%m%d_%H%M%S"));
        let mut name = format!("{}.zip", stem);
        let mut n = 1;
        while self.dir.join(&name).exists() {
            name = format!("{}_{}.zip", stem, n);
            n += 1;
        }
        name
    }
}

fn is_backup_name(name: &str) -> bool {
    name.starts_with("backup_") && name.ends_with(".zip")
}

fn read_metadata(path: &Path) -> StorageResult<BackupMetadata> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut entry = archive.by_name(METADATA_ENTRY)?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Theme;
    use tempfile::tempdir;

    #[test]
    fn test_create_and_read_backup() {
        let dir = tempdir().unwrap();
        let manager = BackupManager::new(dir.path(), 7).unwrap();

        let mut state = AppState::default();
        state.theme = Theme::Dark;
        state.user.name = "Lin".to_string();

        let info = manager.create(&state).unwrap();
        assert!(info.path.exists());
        assert!(info.name.starts_with("backup_"));

        let snapshot = manager.read_snapshot(&info.name).unwrap();
        let restored: AppState = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_list_newest_first() {
        let dir = tempdir().unwrap();
        let manager = BackupManager::new(dir.path(), 7).unwrap();
        let state = AppState::default();

        let now = Utc::now();
        let older = manager.create_at(&state, now - Duration::hours(2)).unwrap();
        let newer = manager.create_at(&state, now).unwrap();

        let list = manager.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, newer.name);
        assert_eq!(list[1].name, older.name);
    }

    #[test]
    fn test_same_second_backups_get_distinct_names() {
        let dir = tempdir().unwrap();
        let manager = BackupManager::new(dir.path(), 7).unwrap();
        let now = Utc::now();

        let a = manager.create_at(&AppState::default(), now).unwrap();
        let b = manager.create_at(&AppState::default(), now).unwrap();
        assert_ne!(a.name, b.name);
        assert_eq!(manager.list().unwrap().len(), 2);
    }

    #[test]
    fn test_prune_removes_expired() {
        let dir = tempdir().unwrap();
        let manager = BackupManager::new(dir.path(), 7).unwrap();
        let state = AppState::default();
        let now = Utc::now();

        manager.create_at(&state, now - Duration::days(10)).unwrap();
        let recent = manager.create_at(&state, now - Duration::days(1)).unwrap();

        assert_eq!(manager.prune(now).unwrap(), 1);
        let list = manager.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, recent.name);
    }

    #[test]
    fn test_read_snapshot_rejects_traversal() {
        let dir = tempdir().unwrap();
        let manager = BackupManager::new(dir.path(), 7).unwrap();

        assert!(matches!(
            manager.read_snapshot("../backup_x.zip"),
            Err(StorageError::BackupNotFound(_))
        ));
        assert!(matches!(
            manager.read_snapshot("backup_missing.zip"),
            Err(StorageError::BackupNotFound(_))
        ));
    }

    #[test]
    fn test_list_ignores_foreign_files() {
        let dir = tempdir().unwrap();
        let manager = BackupManager::new(dir.path(), 7).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join("backup_broken.zip"), "not a zip").unwrap();

        assert!(manager.list().unwrap().is_empty());
    }
}
