//! Transfer Routes
//!
//! Export, import and reset of the whole state.
//!
//! - GET /api/v1/export - Download the state as a dated JSON attachment
//! - POST /api/v1/import - Apply a snapshot (400 on parse failure)
//! - POST /api/v1/reset - Clear stored data and return to defaults

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use std::sync::Arc;

use crate::api::dto::MutationResponse;
use crate::api::error::ApiResult;
use crate::api::state::ApiState;
use crate::state::AppState;
use crate::transfer::{export_filename, export_snapshot, import_snapshot};

/// GET /api/v1/export
pub async fn export_state(State(state): State<Arc<ApiState>>) -> ApiResult<Response> {
    let body = {
        let store = state.store.read().await;
        export_snapshot(store.state())?
    };
    let filename = export_filename(Local::now().date_naive());

    tracing::info!(filename = %filename, bytes = body.len(), "State exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

/// POST /api/v1/import
///
/// The body is the snapshot text. Fields absent from it keep their current
/// values.
pub async fn import_state(
    State(state): State<Arc<ApiState>>,
    body: String,
) -> ApiResult<Json<MutationResponse<AppState>>> {
    let mut store = state.store.write().await;
    let save = import_snapshot(&mut store, &body)?;
    Ok(Json(MutationResponse::new(store.snapshot(), save)))
}

/// POST /api/v1/reset
pub async fn reset_state(State(state): State<Arc<ApiState>>) -> Json<MutationResponse<AppState>> {
    let mut store = state.store.write().await;
    let save = store.reset();
    Json(MutationResponse::new(store.snapshot(), save))
}
