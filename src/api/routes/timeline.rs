//! Timeline and Summary Routes
//!
//! - GET /api/v1/timeline - Journal and fuel events grouped by day
//! - GET /api/v1/summary - Dashboard numbers

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, Utc};
use std::sync::Arc;

use crate::api::dto::{DayGroupResponse, TimelineParams};
use crate::api::state::ApiState;
use crate::views::{timeline_by_day, Summary, TimelineEvent};

/// GET /api/v1/timeline
///
/// Query parameters: `filter` (all, journal, fuel), `search`, `language`.
pub async fn get_timeline(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<TimelineParams>,
) -> Json<Vec<DayGroupResponse<TimelineEvent>>> {
    let store = state.store.read().await;
    let language = params.language.unwrap_or(store.state().language);

    let groups = timeline_by_day(store.state(), params.filter, &params.search, &Local)
        .into_iter()
        .map(|g| DayGroupResponse::from_group(g, language))
        .collect();

    Json(groups)
}

/// GET /api/v1/summary
pub async fn get_summary(State(state): State<Arc<ApiState>>) -> Json<Summary> {
    let store = state.store.read().await;
    Json(Summary::compute(store.state(), Utc::now()))
}
