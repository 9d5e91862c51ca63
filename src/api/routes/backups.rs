//! Backup Routes
//!
//! - GET /api/v1/backups - List archives, newest first
//! - POST /api/v1/backups - Archive the current state and prune expired archives
//! - POST /api/v1/backups/:name/restore - Import an archived snapshot

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{BackupCreatedResponse, BackupListResponse, MutationResponse};
use crate::api::error::ApiResult;
use crate::api::state::ApiState;
use crate::state::AppState;
use crate::transfer::import_snapshot;

/// GET /api/v1/backups
pub async fn list_backups(State(state): State<Arc<ApiState>>) -> ApiResult<Json<BackupListResponse>> {
    let backups = state.backups.list()?;
    Ok(Json(BackupListResponse {
        total: backups.len(),
        backups,
        retention_days: state.backups.retention_days(),
    }))
}

/// POST /api/v1/backups
pub async fn create_backup(
    State(state): State<Arc<ApiState>>,
) -> ApiResult<(StatusCode, Json<BackupCreatedResponse>)> {
    let snapshot = state.store.read().await.snapshot();
    let now = Utc::now();

    let backup = state.backups.create_at(&snapshot, now)?;
    let pruned = state.backups.prune(now)?;

    Ok((StatusCode::CREATED, Json(BackupCreatedResponse { backup, pruned })))
}

/// POST /api/v1/backups/:name/restore
pub async fn restore_backup(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<MutationResponse<AppState>>> {
    let snapshot = state.backups.read_snapshot(&name)?;

    let mut store = state.store.write().await;
    let save = import_snapshot(&mut store, &snapshot)?;
    tracing::info!(backup = %name, "Backup restored");

    Ok(Json(MutationResponse::new(store.snapshot(), save)))
}
