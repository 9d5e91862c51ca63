//! Export and import of state snapshots
//!
//! Export writes the whole state as pretty JSON. Import parses the text as a
//! partial state and applies it through the store, so fields absent from the
//! file keep their current values and unknown fields are ignored.

use chrono::NaiveDate;
use thiserror::Error;

use crate::state::{AppState, StatePatch};
use crate::store::{AppStore, SaveStatus};

/// Errors that can occur while importing a snapshot
#[derive(Error, Debug)]
pub enum TransferError {
    /// Not JSON, or a field has the wrong type
    #[error("Invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// Valid JSON whose top level is not an object
    #[error("Snapshot must be a JSON object")]
    NotAnObject,

    /// Serializing the state failed
    #[error("Export failed: {0}")]
    Export(String),
}

/// Pretty-printed JSON of the complete state
pub fn export_snapshot(state: &AppState) -> Result<String, TransferError> {
    serde_json::to_string_pretty(state).map_err(|e| TransferError::Export(e.to_string()))
}

/// Download name for an export made on `date`
pub fn export_filename(date: NaiveDate) -> String {
    format!("life-canvas-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Parse snapshot text into a partial update without applying it
pub fn parse_snapshot(text: &str) -> Result<StatePatch, TransferError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(TransferError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

/// Apply snapshot text to the store
///
/// On any parse error the state is left untouched.
pub fn import_snapshot(store: &mut AppStore, text: &str) -> Result<SaveStatus, TransferError> {
    let patch = match parse_snapshot(text) {
        Ok(patch) => patch,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected snapshot import");
            return Err(e);
        }
    };

    tracing::info!(fields = ?patch.fields(), "Importing snapshot");
    Ok(store.update_state(patch))
}
