//! Life Canvas API Server
//!
//! Run with: cargo run --bin life-canvas
//!
//! # Configuration
//!
//! Read from `--config <path>` or the default locations (see
//! `life_canvas::config`). Environment variables:
//! - `LIFE_CANVAS_DATA_DIR`: Directory holding the state snapshot
//! - `LIFE_CANVAS_API_HOST`: Host to bind to (default: 127.0.0.1)
//! - `LIFE_CANVAS_API_PORT`: Port to listen on (default: 8093)
//! - `LIFE_CANVAS_LOG_LEVEL`, `LIFE_CANVAS_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the log filter entirely

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

use life_canvas::api::{serve, ApiConfig, ApiState};
use life_canvas::config::Config;
use life_canvas::storage::{BackupManager, FileStorage};
use life_canvas::store::{AppStore, LoadStatus};

#[derive(Parser)]
#[command(name = "life-canvas")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Life Canvas companion backend")]
struct Args {
    /// Config file (default: standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    life_canvas::logging::init(&config.logging).context("Failed to initialize logging")?;

    tracing::info!("Starting Life Canvas v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config.storage.data_path();
    tracing::info!("Data directory: {:?}", data_dir);

    let storage = FileStorage::new(&data_dir)
        .with_context(|| format!("Failed to open data directory {:?}", data_dir))?;
    let store = AppStore::load_with_key(storage, config.storage.state_key.clone());

    match store.load_status() {
        LoadStatus::Fresh => tracing::info!("No saved state found, starting fresh"),
        LoadStatus::Restored => tracing::info!("Saved state restored"),
        LoadStatus::Fallback {
            reason,
            preserved_as,
        } => {
            tracing::warn!(
                reason = %reason,
                preserved_as = ?preserved_as,
                "Saved state unreadable, running on defaults"
            )
        }
    }

    let backups = BackupManager::new(config.backup_dir(), config.backup.retention_days)
        .context("Failed to open backup directory")?;
    match backups.prune(Utc::now()) {
        Ok(0) => {}
        Ok(n) => tracing::info!(pruned = n, "Removed expired backups"),
        Err(e) => tracing::warn!(error = %e, "Failed to prune backups"),
    }

    let mut api_config = ApiConfig::from(&config.api);
    if let Some(port) = args.port {
        api_config.port = port;
    }

    serve(ApiState::new(store, backups, api_config)).await?;

    tracing::info!("Life Canvas stopped");
    Ok(())
}
