//! State Routes
//!
//! Whole-state reads and writes plus the single-field setters.
//!
//! - GET /api/v1/state - Current state with load/save diagnostics
//! - PATCH /api/v1/state - Shallow partial update
//! - PUT /api/v1/dimensions/:type - Set one dimension score
//! - PUT /api/v1/theme - Set the theme
//! - POST /api/v1/lock - Lock the app
//! - POST /api/v1/unlock - Unlock with a 4-digit PIN

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{MutationResponse, ScoreRequest, StateResponse, ThemeRequest, UnlockRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::ApiState;
use crate::state::{AppState, DimensionType, StatePatch};

/// GET /api/v1/state
pub async fn get_state(State(state): State<Arc<ApiState>>) -> Json<StateResponse> {
    let store = state.store.read().await;
    Json(StateResponse {
        state: store.snapshot(),
        load_status: store.load_status().clone(),
        last_save: store.last_save().cloned(),
    })
}

/// PATCH /api/v1/state
///
/// Present top-level fields replace the current values wholesale.
pub async fn patch_state(
    State(state): State<Arc<ApiState>>,
    Json(patch): Json<StatePatch>,
) -> Json<MutationResponse<AppState>> {
    let mut store = state.store.write().await;
    let save = store.update_state(patch);
    Json(MutationResponse::new(store.snapshot(), save))
}

/// PUT /api/v1/dimensions/:type
///
/// The score is rounded and clamped to 0..=100.
pub async fn update_dimension(
    State(state): State<Arc<ApiState>>,
    Path(dimension): Path<String>,
    Json(req): Json<ScoreRequest>,
) -> ApiResult<Json<MutationResponse<AppState>>> {
    let dimension: DimensionType = dimension.parse().map_err(ApiError::NotFound)?;

    let mut store = state.store.write().await;
    let save = store.update_dimension(dimension, req.score);
    Ok(Json(MutationResponse::new(store.snapshot(), save)))
}

/// PUT /api/v1/theme
pub async fn set_theme(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<ThemeRequest>,
) -> Json<MutationResponse<AppState>> {
    let mut store = state.store.write().await;
    let save = store.set_theme(req.theme);
    Json(MutationResponse::new(store.snapshot(), save))
}

/// POST /api/v1/lock
pub async fn lock(State(state): State<Arc<ApiState>>) -> Json<MutationResponse<bool>> {
    let mut store = state.store.write().await;
    let save = store.lock();
    Json(MutationResponse::new(store.state().is_locked, save))
}

/// POST /api/v1/unlock
///
/// Any four digits unlock.
pub async fn unlock(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<UnlockRequest>,
) -> ApiResult<Json<MutationResponse<bool>>> {
    let mut store = state.store.write().await;
    let save = store.unlock_with_pin(&req.pin)?;
    Ok(Json(MutationResponse::new(store.state().is_locked, save)))
}
