//! Life Canvas Storage
//!
//! - **slot**: the durable key-value slot the store persists its snapshot to
//! - **backup**: zip archives of snapshots with retention
//! - **error**: Error types
//!
//! # Write Path
//!
//! ```text
//! AppState → serde_json → SnapshotStorage::write(key) → <data_dir>/<key>.json
//! ```

pub mod backup;
pub mod error;
pub mod slot;

pub use backup::{BackupInfo, BackupManager, BackupMetadata};
pub use error::{StorageError, StorageResult};
pub use slot::{FileStorage, MemoryStorage, SnapshotStorage};
