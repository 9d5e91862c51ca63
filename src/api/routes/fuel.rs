//! Fuel Routes
//!
//! - GET /api/v1/fuel - Baseline, deviations and consistency score
//! - PUT /api/v1/fuel/baseline - Replace the baseline text
//! - POST /api/v1/fuel/deviations - Log a deviation
//! - DELETE /api/v1/fuel/deviations/:id - Delete a deviation

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{BaselineRequest, FuelResponse, MutationResponse};
use crate::api::error::ApiResult;
use crate::api::state::ApiState;
use crate::state::{Deviation, FuelSystem};
use crate::store::DeviationDraft;
use crate::views::fuel_consistency;

fn fuel_response(fuel: &FuelSystem) -> FuelResponse {
    FuelResponse {
        baseline: fuel.baseline.clone(),
        deviations: fuel.deviations.clone(),
        consistency: fuel_consistency(fuel.deviations.len()),
    }
}

/// GET /api/v1/fuel
pub async fn get_fuel(State(state): State<Arc<ApiState>>) -> Json<FuelResponse> {
    let store = state.store.read().await;
    Json(fuel_response(&store.state().fuel_system))
}

/// PUT /api/v1/fuel/baseline
pub async fn set_baseline(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<BaselineRequest>,
) -> Json<MutationResponse<FuelResponse>> {
    let mut store = state.store.write().await;
    let save = store.set_baseline(req.baseline);
    Json(MutationResponse::new(
        fuel_response(&store.state().fuel_system),
        save,
    ))
}

/// POST /api/v1/fuel/deviations
///
/// `type` defaults to `other`.
pub async fn add_deviation(
    State(state): State<Arc<ApiState>>,
    Json(draft): Json<DeviationDraft>,
) -> ApiResult<(StatusCode, Json<MutationResponse<Deviation>>)> {
    let mut store = state.store.write().await;
    let (deviation, save) = store.add_deviation(draft)?;
    Ok((StatusCode::CREATED, Json(MutationResponse::new(deviation, save))))
}

/// DELETE /api/v1/fuel/deviations/:id
pub async fn delete_deviation(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MutationResponse<Deviation>>> {
    let mut store = state.store.write().await;
    let (removed, save) = store.remove_deviation(&id)?;
    Ok(Json(MutationResponse::new(removed, save)))
}
