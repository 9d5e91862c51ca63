//! Store error types

use thiserror::Error;

/// Errors from record operations on the store
///
/// Persistence failures are never errors; they surface as
/// `SaveStatus::Failed`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Journal content or deviation description is blank
    #[error("Content must not be empty")]
    EmptyContent,

    /// No record with that id
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Profile value already present
    #[error("Value already exists: {0}")]
    DuplicateValue(String),

    /// PIN is not four digits
    #[error("PIN must be exactly 4 digits")]
    InvalidPin,
}

impl StoreError {
    pub(crate) fn journal_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: "Journal entry",
            id: id.to_string(),
        }
    }

    pub(crate) fn deviation_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: "Deviation",
            id: id.to_string(),
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
