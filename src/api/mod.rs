//! Life Canvas REST API
//!
//! Local companion backend built with Axum. Every mutation goes through the
//! single `AppStore`, so persistence and change notification behave the same
//! as for an embedded store.
//!
//! # Endpoints
//!
//! ## State
//! - `GET /api/v1/state` - Current state with load/save diagnostics
//! - `PATCH /api/v1/state` - Shallow partial update
//! - `PUT /api/v1/dimensions/:type` - Set one dimension score
//! - `PUT /api/v1/theme` - Set the theme
//! - `POST /api/v1/lock`, `POST /api/v1/unlock` - PIN screen gate
//!
//! ## Journals
//! - `GET /api/v1/journals` - Paged listing with filters
//! - `POST /api/v1/journals` - Create an entry
//! - `GET /api/v1/journals/grouped` - Search results grouped by day
//! - `GET /api/v1/journals/moods` - Mood distribution
//! - `GET|PUT|DELETE /api/v1/journals/:id` - Single entry
//!
//! ## Fuel
//! - `GET /api/v1/fuel` - Baseline, deviations, consistency
//! - `PUT /api/v1/fuel/baseline` - Replace the baseline
//! - `POST /api/v1/fuel/deviations` - Log a deviation
//! - `DELETE /api/v1/fuel/deviations/:id` - Delete a deviation
//!
//! ## Profile
//! - `POST /api/v1/profile/values` - Add a personal value
//! - `DELETE /api/v1/profile/values/:value` - Remove a personal value
//!
//! ## Views
//! - `GET /api/v1/timeline` - Journal and fuel events by day
//! - `GET /api/v1/summary` - Dashboard numbers
//!
//! ## Data
//! - `GET /api/v1/export` - Download a snapshot
//! - `POST /api/v1/import` - Apply a snapshot
//! - `POST /api/v1/reset` - Clear all data
//! - `GET|POST /api/v1/backups` - List / create backup archives
//! - `POST /api/v1/backups/:name/restore` - Restore an archive
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /api/v1/ws` - State snapshots on every change
//!
//! # Example
//!
//! ```rust,ignore
//! use life_canvas::api::{serve, ApiConfig, ApiState};
//! use life_canvas::storage::{BackupManager, FileStorage};
//! use life_canvas::store::AppStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = AppStore::load(FileStorage::new("./data")?);
//!     let backups = BackupManager::new("./data/backups", 7)?;
//!
//!     serve(ApiState::new(store, backups, ApiConfig::default())).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, ApiState};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        // State routes
        .route(
            "/state",
            get(routes::state::get_state).patch(routes::state::patch_state),
        )
        .route("/dimensions/:dimension", put(routes::state::update_dimension))
        .route("/theme", put(routes::state::set_theme))
        .route("/lock", post(routes::state::lock))
        .route("/unlock", post(routes::state::unlock))
        // Journal routes
        .route(
            "/journals",
            get(routes::journals::list_journals).post(routes::journals::create_journal),
        )
        .route("/journals/grouped", get(routes::journals::grouped_journals))
        .route("/journals/moods", get(routes::journals::mood_stats))
        .route(
            "/journals/:id",
            get(routes::journals::get_journal)
                .put(routes::journals::update_journal)
                .delete(routes::journals::delete_journal),
        )
        // Fuel routes
        .route("/fuel", get(routes::fuel::get_fuel))
        .route("/fuel/baseline", put(routes::fuel::set_baseline))
        .route("/fuel/deviations", post(routes::fuel::add_deviation))
        .route("/fuel/deviations/:id", delete(routes::fuel::delete_deviation))
        // Profile routes
        .route("/profile/values", post(routes::profile::add_value))
        .route("/profile/values/:value", delete(routes::profile::remove_value))
        // View routes
        .route("/timeline", get(routes::timeline::get_timeline))
        .route("/summary", get(routes::timeline::get_summary))
        // Data routes
        .route("/export", get(routes::transfer::export_state))
        .route("/import", post(routes::transfer::import_state))
        .route("/reset", post(routes::transfer::reset_state))
        .route(
            "/backups",
            get(routes::backups::list_backups).post(routes::backups::create_backup),
        )
        .route("/backups/:name/restore", post(routes::backups::restore_backup))
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        // WebSocket route
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS for the configured origins, or any origin when none are set
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: ApiState) -> Result<(), ApiError> {
    let addr = state.config.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Life Canvas API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Life Canvas API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
