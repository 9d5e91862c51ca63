//! Profile Routes
//!
//! - POST /api/v1/profile/values - Add a personal value
//! - DELETE /api/v1/profile/values/:value - Remove a personal value

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{MutationResponse, ValueRequest};
use crate::api::error::ApiResult;
use crate::api::state::ApiState;

/// POST /api/v1/profile/values
///
/// The value is trimmed; blanks are rejected with 400 and duplicates with 409.
pub async fn add_value(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<ValueRequest>,
) -> ApiResult<(StatusCode, Json<MutationResponse<Vec<String>>>)> {
    let mut store = state.store.write().await;
    let save = store.add_value(&req.value)?;
    let values = store.state().user.values.clone();
    Ok((StatusCode::CREATED, Json(MutationResponse::new(values, save))))
}

/// DELETE /api/v1/profile/values/:value
pub async fn remove_value(
    State(state): State<Arc<ApiState>>,
    Path(value): Path<String>,
) -> ApiResult<Json<MutationResponse<Vec<String>>>> {
    let mut store = state.store.write().await;
    let save = store.remove_value(&value)?;
    let values = store.state().user.values.clone();
    Ok(Json(MutationResponse::new(values, save)))
}
