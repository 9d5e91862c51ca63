//! AppState Store
//!
//! The single owner of `AppState`. Every mutation goes through the store,
//! is written through to the storage slot synchronously, and is published
//! to read subscribers.
//!
//! ```text
//! load:   slot → JSON → deep merge over defaults → AppState
//! update: StatePatch → AppState (in memory) → slot (write-through) → subscribers
//! ```
//!
//! Storage failures never propagate. Loading degrades to the default state
//! (`LoadStatus::Fallback`); saving keeps the in-memory update and reports
//! `SaveStatus::Failed`. An unreadable snapshot is copied to a
//! `<key>-corrupt-<timestamp>` slot before anything can overwrite it.
//!
//! # Example
//!
//! ```rust
//! use life_canvas::state::DimensionType;
//! use life_canvas::storage::MemoryStorage;
//! use life_canvas::store::AppStore;
//!
//! let mut store = AppStore::load(MemoryStorage::new());
//! store.update_dimension(DimensionType::Fuel, 104.2);
//! assert_eq!(store.state().dimensions.get(DimensionType::Fuel), 100);
//! ```

pub mod error;
pub mod records;

pub use error::{StoreError, StoreResult};
pub use records::{DeviationDraft, JournalDraft};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;

use crate::state::{merge_over_defaults, AppState, DimensionType, StatePatch, Theme};
use crate::storage::SnapshotStorage;

/// Storage key the snapshot lives under
pub const STATE_KEY: &str = "life-canvas-state";

/// How the initial state was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    /// Nothing stored; defaults in use
    Fresh,
    /// Stored snapshot merged over defaults
    Restored,
    /// Stored snapshot unreadable; defaults in use
    ///
    /// `preserved_as` names the slot holding a copy of the unreadable text,
    /// `None` when there was nothing to copy or the copy failed.
    Fallback {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        preserved_as: Option<String>,
    },
}

/// Result of reading the stored snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub state: AppState,
    pub status: LoadStatus,
}

/// Result of writing the snapshot after a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveStatus {
    /// Stored snapshot equals the in-memory state
    Saved,
    /// Write failed; memory holds the update, storage holds an older snapshot
    Failed { reason: String },
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved)
    }
}

/// Holds the application state and persists it on every change
pub struct AppStore {
    storage: Box<dyn SnapshotStorage>,
    key: String,
    state: AppState,
    load_status: LoadStatus,
    last_save: Option<SaveStatus>,
    updates: watch::Sender<AppState>,
}

impl AppStore {
    /// Load the store from `storage` under the default key
    pub fn load(storage: impl SnapshotStorage + 'static) -> Self {
        Self::load_with_key(storage, STATE_KEY)
    }

    /// Load the store from `storage` under `key`
    pub fn load_with_key(storage: impl SnapshotStorage + 'static, key: impl Into<String>) -> Self {
        let key = key.into();
        let outcome = Self::read_snapshot(&storage, &key);
        let (updates, _) = watch::channel(outcome.state.clone());

        Self {
            storage: Box::new(storage),
            key,
            state: outcome.state,
            load_status: outcome.status,
            last_save: None,
            updates,
        }
    }

    /// Read and default-merge the snapshot stored under `key`
    ///
    /// Never fails: any read or parse problem yields the default state with
    /// `LoadStatus::Fallback`. Text that was read but could not be parsed is
    /// first copied to a sibling slot.
    pub fn read_snapshot(storage: &dyn SnapshotStorage, key: &str) -> LoadOutcome {
        let raw = match storage.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!(key = %key, "No stored state, starting from defaults");
                return LoadOutcome {
                    state: AppState::default(),
                    status: LoadStatus::Fresh,
                };
            }
            Err(e) => return fallback(key, e.to_string(), None),
        };

        let parsed = serde_json::from_str::<serde_json::Value>(&raw)
            .and_then(merge_over_defaults);

        match parsed {
            Ok(state) => {
                tracing::info!(
                    key = %key,
                    journals = state.journals.len(),
                    deviations = state.fuel_system.deviations.len(),
                    "Restored stored state"
                );
                LoadOutcome {
                    state,
                    status: LoadStatus::Restored,
                }
            }
            Err(e) => {
                let preserved_as = preserve_unreadable(storage, key, &raw);
                fallback(key, e.to_string(), preserved_as)
            }
        }
    }

    /// Current state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> AppState {
        self.state.clone()
    }

    /// How the state was obtained at startup
    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    /// Outcome of the most recent write, `None` before the first change
    pub fn last_save(&self) -> Option<&SaveStatus> {
        self.last_save.as_ref()
    }

    /// Storage key in use
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Subscribe to state changes
    ///
    /// The receiver starts at the current state and observes the state after
    /// every mutation and reset.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.updates.subscribe()
    }

    /// Shallow-merge `patch` into the state and persist
    ///
    /// Nested records present in the patch replace the current ones
    /// wholesale. An empty patch still writes the snapshot.
    pub fn update_state(&mut self, patch: StatePatch) -> SaveStatus {
        tracing::debug!(fields = ?patch.fields(), "Updating state");
        patch.apply(&mut self.state);
        self.commit()
    }

    /// Set one dimension score, rounded and clamped to [0, 100]
    pub fn update_dimension(&mut self, dimension: DimensionType, score: f64) -> SaveStatus {
        let stored = self.state.dimensions.set(dimension, score);
        tracing::debug!(dimension = %dimension, requested = score, stored, "Dimension updated");
        self.commit()
    }

    pub fn set_theme(&mut self, theme: Theme) -> SaveStatus {
        self.update_state(StatePatch::default().theme(theme))
    }

    pub fn lock(&mut self) -> SaveStatus {
        self.update_state(StatePatch::default().locked(true))
    }

    pub fn unlock(&mut self) -> SaveStatus {
        self.update_state(StatePatch::default().locked(false))
    }

    /// Unlock if `pin` is four ASCII digits
    ///
    /// Any four digits pass. This is a screen gate, not authentication.
    pub fn unlock_with_pin(&mut self, pin: &str) -> StoreResult<SaveStatus> {
        if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(StoreError::InvalidPin);
        }
        Ok(self.unlock())
    }

    /// Clear the stored snapshot and return to defaults
    ///
    /// Nothing is written until the next change.
    pub fn reset(&mut self) -> SaveStatus {
        let status = match self.storage.remove(&self.key) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to clear stored state");
                SaveStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        self.state = AppState::default();
        self.updates.send_replace(self.state.clone());
        tracing::info!(key = %self.key, "State reset to defaults");

        self.last_save = Some(status.clone());
        status
    }

    /// Persist the current state and notify subscribers
    fn commit(&mut self) -> SaveStatus {
        let status = self.persist(&self.state);
        self.updates.send_replace(self.state.clone());
        self.last_save = Some(status.clone());
        status
    }

    /// Serialize `state` and overwrite the slot
    fn persist(&self, state: &AppState) -> SaveStatus {
        let result = serde_json::to_string(state)
            .map_err(crate::storage::StorageError::from)
            .and_then(|json| self.storage.write(&self.key, &json));

        match result {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                tracing::error!(
                    key = %self.key,
                    error = %e,
                    "Failed to persist state, keeping in-memory copy"
                );
                SaveStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("key", &self.key)
            .field("load_status", &self.load_status)
            .field("last_save", &self.last_save)
            .finish_non_exhaustive()
    }
}

fn fallback(key: &str, reason: String, preserved_as: Option<String>) -> LoadOutcome {
    tracing::warn!(
        key = %key,
        error = %reason,
        preserved_as = ?preserved_as,
        "Stored state unreadable, using defaults"
    );
    LoadOutcome {
        state: AppState::default(),
        status: LoadStatus::Fallback {
            reason,
            preserved_as,
        },
    }
}

/// Copy unparsable snapshot text next to the live slot
fn preserve_unreadable(storage: &dyn SnapshotStorage, key: &str, raw: &str) -> Option<String> {
    let preserved = format!("{}-corrupt-{}", key, Utc::now().format("%Y%m%d%H%M%S%3f"));
    match storage.write(&preserved, raw) {
        Ok(()) => {
            tracing::warn!(key = %key, preserved = %preserved, "Kept a copy of the unreadable state");
            Some(preserved)
        }
        Err(e) => {
            tracing::error!(key = %key, error = %e, "Failed to keep a copy of the unreadable state");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn memory_store() -> (AppStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = AppStore::load(Arc::clone(&storage));
        (store, storage)
    }

    fn stored_state(storage: &MemoryStorage) -> AppState {
        serde_json::from_str(&storage.raw(STATE_KEY).unwrap()).unwrap()
    }

    #[test]
    fn test_load_empty_returns_defaults() {
        let (store, _) = memory_store();
        assert_eq!(store.state(), &AppState::default());
        assert_eq!(store.load_status(), &LoadStatus::Fresh);
        assert!(store.last_save().is_none());
    }

    #[test]
    fn test_load_merges_missing_fields() {
        let storage = MemoryStorage::with_value(
            STATE_KEY,
            r#"{"user": {"name": "Lin", "lifespan": 90}, "isLocked": true, "theme": "light"}"#,
        );
        let store = AppStore::load(storage);
        let defaults = AppState::default();

        assert_eq!(store.load_status(), &LoadStatus::Restored);
        assert_eq!(store.state().user.name, "Lin");
        assert_eq!(store.state().user.lifespan, 90);
        assert_eq!(store.state().user.birthday, defaults.user.birthday);
        assert!(store.state().is_locked);
        assert_eq!(store.state().theme, Theme::Light);
        assert_eq!(store.state().dimensions, defaults.dimensions);
        assert_eq!(store.state().ai_config, defaults.ai_config);
    }

    #[test]
    fn test_load_corrupt_falls_back() {
        let storage = MemoryStorage::with_value(STATE_KEY, "{not json");
        let store = AppStore::load(storage);

        assert_eq!(store.state(), &AppState::default());
        assert!(matches!(store.load_status(), LoadStatus::Fallback { .. }));
    }

    #[test]
    fn test_unknown_deviation_type_keeps_history() {
        let stored = r#"{
            "dimensions": {"FUEL": 61, "PHYSICAL": 70, "INTELLECTUAL": 40, "OUTPUT": 55,
                           "RECOVERY": 80, "ASSET": 30, "CONNECTION": 65, "ENVIRONMENT": 50},
            "journals": [{"id": "j1", "timestamp": 1700000000000,
                          "content": "kept for years", "mood": "good"}],
            "fuelSystem": {"baseline": "", "deviations": [
                {"id": "d1", "timestamp": 1700000000000, "description": "chips", "type": "snack"}
            ]}
        }"#;
        let storage = Arc::new(MemoryStorage::with_value(STATE_KEY, stored));
        let mut store = AppStore::load(Arc::clone(&storage));

        assert_eq!(store.load_status(), &LoadStatus::Restored);
        assert_eq!(store.state().journals[0].content, "kept for years");
        assert_eq!(
            store.state().fuel_system.deviations[0].kind,
            crate::state::DeviationKind::Other
        );

        store.update_dimension(DimensionType::Fuel, 10.0);
        let saved = stored_state(&storage);
        assert_eq!(saved.journals.len(), 1);
        assert_eq!(saved.dimensions.get(DimensionType::Physical), 70);
    }

    #[test]
    fn test_unreadable_snapshot_is_preserved_before_overwrite() {
        let stored = r#"{"journals": [{"id": "j1", "timestamp": 1700000000000,
                         "content": "kept for years", "mood": "ecstatic"}]}"#;
        let storage = Arc::new(MemoryStorage::with_value(STATE_KEY, stored));
        let mut store = AppStore::load(Arc::clone(&storage));

        let preserved = match store.load_status() {
            LoadStatus::Fallback {
                preserved_as: Some(name),
                ..
            } => name.clone(),
            other => panic!("Expected preserved fallback, got {:?}", other),
        };
        assert!(preserved.starts_with("life-canvas-state-corrupt-"));
        assert!(store.state().journals.is_empty());

        store.update_dimension(DimensionType::Fuel, 10.0);
        assert!(stored_state(&storage).journals.is_empty());
        assert_eq!(storage.raw(&preserved).as_deref(), Some(stored));
    }

    #[test]
    fn test_unreadable_snapshot_preserved_on_disk() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.write(STATE_KEY, "{not json").unwrap();

        let store = AppStore::load(storage.clone());
        let LoadStatus::Fallback {
            preserved_as: Some(name),
            ..
        } = store.load_status()
        else {
            panic!("Expected preserved fallback");
        };
        assert_eq!(
            std::fs::read_to_string(storage.path_for(name)).unwrap(),
            "{not json"
        );
    }

    #[test]
    fn test_update_dimension_clamps_and_rounds() {
        let (mut store, storage) = memory_store();

        store.update_dimension(DimensionType::Fuel, -20.0);
        assert_eq!(store.state().dimensions.get(DimensionType::Fuel), 0);

        store.update_dimension(DimensionType::Physical, 250.0);
        assert_eq!(store.state().dimensions.get(DimensionType::Physical), 100);

        store.update_dimension(DimensionType::Output, 66.6);
        assert_eq!(store.state().dimensions.get(DimensionType::Output), 67);

        store.update_dimension(DimensionType::Asset, 12.4);
        assert_eq!(store.state().dimensions.get(DimensionType::Asset), 12);

        assert_eq!(stored_state(&storage), *store.state());
    }

    #[test]
    fn test_empty_update_is_idempotent_and_persists() {
        let (mut store, storage) = memory_store();
        store.set_theme(Theme::Dark);
        let before = store.snapshot();

        let status = store.update_state(StatePatch::default());
        assert_eq!(status, SaveStatus::Saved);
        assert_eq!(store.state(), &before);
        assert_eq!(stored_state(&storage), before);
    }

    #[test]
    fn test_persist_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let mut store = AppStore::load(storage.clone());

        store.update_dimension(DimensionType::Recovery, 88.0);
        store.set_theme(Theme::Light);
        store
            .add_journal(JournalDraft::new("first entry", crate::state::Mood::Great))
            .unwrap();
        store
            .add_deviation(DeviationDraft::new("midnight noodles"))
            .unwrap();
        let expected = store.snapshot();

        let reloaded = AppStore::load(storage);
        assert_eq!(reloaded.load_status(), &LoadStatus::Restored);
        assert_eq!(reloaded.state(), &expected);
    }

    #[test]
    fn test_write_failure_keeps_memory() {
        let (mut store, storage) = memory_store();
        store.set_theme(Theme::Dark);
        storage.set_fail_writes(true);

        let status = store.set_theme(Theme::Light);
        assert!(matches!(status, SaveStatus::Failed { .. }));
        assert_eq!(store.state().theme, Theme::Light);
        assert_eq!(stored_state(&storage).theme, Theme::Dark);
        assert_eq!(store.last_save(), Some(&status));

        storage.set_fail_writes(false);
        assert!(store.lock().is_saved());
        assert_eq!(stored_state(&storage), *store.state());
    }

    #[test]
    fn test_lock_and_unlock() {
        let (mut store, _) = memory_store();
        store.lock();
        assert!(store.state().is_locked);
        store.unlock();
        assert!(!store.state().is_locked);
    }

    #[test]
    fn test_unlock_with_pin_accepts_any_four_digits() {
        let (mut store, _) = memory_store();
        store.lock();

        assert_eq!(store.unlock_with_pin("12a4"), Err(StoreError::InvalidPin));
        assert_eq!(store.unlock_with_pin("123"), Err(StoreError::InvalidPin));
        assert!(store.state().is_locked);

        assert!(store.unlock_with_pin("0000").is_ok());
        assert!(!store.state().is_locked);
    }

    #[test]
    fn test_reset_clears_storage() {
        let (mut store, storage) = memory_store();
        store.set_theme(Theme::Dark);
        assert!(storage.raw(STATE_KEY).is_some());

        assert!(store.reset().is_saved());
        assert_eq!(store.state(), &AppState::default());
        assert!(storage.raw(STATE_KEY).is_none());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let (mut store, _) = memory_store();
        let mut rx = store.subscribe();
        assert_eq!(rx.borrow_and_update().theme, Theme::Auto);

        store.set_theme(Theme::Dark);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().theme, Theme::Dark);

        store.reset();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), AppState::default());
    }

    #[test]
    fn test_custom_key() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = AppStore::load_with_key(Arc::clone(&storage), "profile-b");
        store.lock();
        assert!(storage.raw("profile-b").is_some());
        assert!(storage.raw(STATE_KEY).is_none());
    }
}
