//! Journal Routes
//!
//! - GET /api/v1/journals - Paged listing with search, mood and dimension filters
//! - POST /api/v1/journals - Create an entry
//! - GET /api/v1/journals/grouped - Search results grouped by day
//! - GET /api/v1/journals/moods - Mood distribution
//! - GET /api/v1/journals/:id - Get an entry
//! - PUT /api/v1/journals/:id - Replace an entry
//! - DELETE /api/v1/journals/:id - Delete an entry

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use std::sync::Arc;

use crate::api::dto::{DayGroupResponse, GroupedParams, MutationResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::ApiState;
use crate::state::JournalEntry;
use crate::store::JournalDraft;
use crate::views::{
    filter_journals, group_by_day, mood_distribution, query_journals, JournalPage, JournalQuery,
    MoodDistribution,
};

/// GET /api/v1/journals
pub async fn list_journals(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<JournalQuery>,
) -> Json<JournalPage> {
    let store = state.store.read().await;
    Json(query_journals(&store.state().journals, &query))
}

/// POST /api/v1/journals
///
/// The entry gets a fresh id and the current time and goes first in the list.
pub async fn create_journal(
    State(state): State<Arc<ApiState>>,
    Json(draft): Json<JournalDraft>,
) -> ApiResult<(StatusCode, Json<MutationResponse<JournalEntry>>)> {
    let mut store = state.store.write().await;
    let (entry, save) = store.add_journal(draft)?;
    Ok((StatusCode::CREATED, Json(MutationResponse::new(entry, save))))
}

/// GET /api/v1/journals/grouped
///
/// Day headings use the local time zone.
pub async fn grouped_journals(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<GroupedParams>,
) -> Json<Vec<DayGroupResponse<JournalEntry>>> {
    let store = state.store.read().await;
    let language = params.language.unwrap_or(store.state().language);

    let hits = filter_journals(&store.state().journals, &params.search);
    let groups = group_by_day(hits.into_iter().cloned(), &Local)
        .into_iter()
        .map(|g| DayGroupResponse::from_group(g, language))
        .collect();

    Json(groups)
}

/// GET /api/v1/journals/moods
pub async fn mood_stats(State(state): State<Arc<ApiState>>) -> Json<MoodDistribution> {
    let store = state.store.read().await;
    Json(mood_distribution(&store.state().journals))
}

/// GET /api/v1/journals/:id
pub async fn get_journal(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<JournalEntry>> {
    let store = state.store.read().await;
    store
        .journal(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Journal entry not found: {}", id)))
}

/// PUT /api/v1/journals/:id
///
/// Keeps the id, timestamp and attachments of the existing entry.
pub async fn update_journal(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(draft): Json<JournalDraft>,
) -> ApiResult<Json<MutationResponse<JournalEntry>>> {
    let mut store = state.store.write().await;
    let (entry, save) = store.update_journal(&id, draft)?;
    Ok(Json(MutationResponse::new(entry, save)))
}

/// DELETE /api/v1/journals/:id
pub async fn delete_journal(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MutationResponse<JournalEntry>>> {
    let mut store = state.store.write().await;
    let (removed, save) = store.remove_journal(&id)?;
    Ok(Json(MutationResponse::new(removed, save)))
}
