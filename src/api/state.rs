//! Shared API State
//!
//! State accessible by all API handlers, wrapped in `Arc` by the router.
//! The store sits behind a single `RwLock`, so at most one mutation (and
//! its write-through) runs at a time.

use std::time::Instant;
use tokio::sync::RwLock;

use crate::storage::BackupManager;
use crate::store::AppStore;

/// Shared state for all handlers
pub struct ApiState {
    /// The application state store
    pub store: RwLock<AppStore>,
    /// Snapshot backups
    pub backups: BackupManager,
    /// API configuration
    pub config: ApiConfig,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl ApiState {
    pub fn new(store: AppStore, backups: BackupManager, config: ApiConfig) -> Self {
        Self {
            store: RwLock::new(store),
            backups,
            config,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8093,
            max_body_size: 10 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&crate::config::ApiConfig> for ApiConfig {
    fn from(config: &crate::config::ApiConfig) -> Self {
        Self {
            cors_origins: config.cors_origins.clone(),
            ..Self::new(config.host.clone(), config.port)
        }
    }
}
