//! # Life Canvas
//!
//! Personal life tracking - eight life dimensions, a mood journal and a diet
//! baseline, kept as one JSON state snapshot and served over a REST API.
//!
//! ## Features
//!
//! - **Single state store**: every change goes through one merge-and-persist path
//! - **Durable snapshots**: atomic file writes, timestamped backup archives
//! - **Derived views**: timeline, day groups, mood stats, balance and life progress
//! - **Real-time**: WebSocket feed pushes a fresh snapshot after each change
//!
//! ## Modules
//!
//! - [`state`]: The `AppState` model and partial updates
//! - [`storage`]: Snapshot slots and backup archives
//! - [`store`]: The state store and its record operations
//! - [`views`]: Pure derived views over a state
//! - [`transfer`]: Export and import of full snapshots
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use life_canvas::state::{DimensionType, Mood};
//! use life_canvas::storage::FileStorage;
//! use life_canvas::store::{AppStore, JournalDraft};
//! use life_canvas::views::{timeline, TimelineFilter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = AppStore::load(FileStorage::new("./data")?);
//!
//!     store.update_dimension(DimensionType::Physical, 72.0);
//!     store.add_journal(
//!         JournalDraft::new("Ran 5k before work", Mood::Great).linked(DimensionType::Physical),
//!     )?;
//!
//!     for event in timeline(store.state(), TimelineFilter::All, "") {
//!         println!("{} {}", event.timestamp, event.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod state;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod views;
pub mod websocket;

// Re-export top-level types for convenience
pub use state::{AppState, DimensionType, JournalEntry, Mood, StatePatch};

pub use storage::{BackupManager, FileStorage, MemoryStorage, SnapshotStorage, StorageError};

pub use store::{AppStore, LoadStatus, SaveStatus, StoreError, StoreResult};

pub use api::{build_router, serve, ApiConfig, ApiError, ApiState};

pub use transfer::{export_snapshot, import_snapshot, parse_snapshot, TransferError};

pub use websocket::{websocket_handler, ClientMessage, ServerMessage};

pub use config::{Config, ConfigError, LoggingConfig};
