//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::state::{AppState, Deviation, Language, Theme};
use crate::store::{LoadStatus, SaveStatus};
use crate::views::{DayGroup, TimelineFilter};

// ============================================
// COMMON DTOs
// ============================================

/// Result of a mutation plus the outcome of persisting it
///
/// `save` reports a failed write even though the change is live in memory.
#[derive(Debug, Serialize)]
pub struct MutationResponse<T> {
    pub data: T,
    pub save: SaveStatus,
}

impl<T> MutationResponse<T> {
    pub fn new(data: T, save: SaveStatus) -> Self {
        Self { data, save }
    }
}

/// A day bucket with its display heading
#[derive(Debug, Serialize)]
pub struct DayGroupResponse<T> {
    pub date: NaiveDate,
    pub label: String,
    pub items: Vec<T>,
}

impl<T> DayGroupResponse<T> {
    pub fn from_group(group: DayGroup<T>, language: Language) -> Self {
        Self {
            label: group.label(language),
            date: group.date,
            items: group.items,
        }
    }
}

// ============================================
// STATE DTOs
// ============================================

/// Full state with load and save diagnostics
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: AppState,
    pub load_status: LoadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_save: Option<SaveStatus>,
}

/// Dimension score update
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub score: f64,
}

/// Theme update
#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

/// Unlock request
#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub pin: String,
}

// ============================================
// JOURNAL DTOs
// ============================================

/// Parameters for day-grouped listings
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GroupedParams {
    pub search: String,
    /// Heading language; defaults to the stored preference
    pub language: Option<Language>,
}

/// Parameters for the timeline
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TimelineParams {
    pub filter: TimelineFilter,
    pub search: String,
    pub language: Option<Language>,
}

// ============================================
// FUEL DTOs
// ============================================

/// Diet baseline, deviations and the derived consistency score
#[derive(Debug, Serialize)]
pub struct FuelResponse {
    pub baseline: String,
    pub deviations: Vec<Deviation>,
    pub consistency: u8,
}

/// Baseline update
#[derive(Debug, Deserialize)]
pub struct BaselineRequest {
    pub baseline: String,
}

// ============================================
// PROFILE DTOs
// ============================================

/// Personal value to add
#[derive(Debug, Deserialize)]
pub struct ValueRequest {
    pub value: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Storage status: ok, error
    pub storage: String,
    /// How the state was obtained at startup
    pub load_status: LoadStatus,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

// ============================================
// BACKUP DTOs
// ============================================

/// Backup listing
#[derive(Debug, Serialize)]
pub struct BackupListResponse {
    pub backups: Vec<crate::storage::BackupInfo>,
    pub total: usize,
    pub retention_days: u32,
}

/// Result of creating a backup
#[derive(Debug, Serialize)]
pub struct BackupCreatedResponse {
    pub backup: crate::storage::BackupInfo,
    /// Expired archives removed in the same call
    pub pruned: usize,
}
