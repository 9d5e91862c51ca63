//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! Lookup order for the file: `$CONFIG_DIR/life-canvas/config.toml`, then
//! `./config.toml`. Missing files fall back to defaults; environment
//! variables are applied last in every case.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::store::STATE_KEY;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub backup: BackupConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot slot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_state_key")]
    pub state_key: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("life-canvas").to_string_lossy().to_string())
        .unwrap_or_else(|| "./life_canvas_data".to_string())
}

fn default_state_key() -> String {
    STATE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            state_key: default_state_key(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8093
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Backup archive configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackupConfig {
    /// Defaults to `<data_dir>/backups`
    #[serde(default)]
    pub dir: Option<String>,

    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    7
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir: None,
            retention_days: default_retention_days(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("life-canvas").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Backup directory, resolved against the data directory
    pub fn backup_dir(&self) -> PathBuf {
        match &self.backup.dir {
            Some(dir) => expand_home(dir),
            None => self.storage.data_path().join("backups"),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = lookup("LIFE_CANVAS_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Some(host) = lookup("LIFE_CANVAS_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("LIFE_CANVAS_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid LIFE_CANVAS_API_PORT"),
            }
        }

        if let Some(level) = lookup("LIFE_CANVAS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LIFE_CANVAS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Replace a leading `~` with the home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Life Canvas Configuration
#
# Environment variables override these settings:
# - LIFE_CANVAS_DATA_DIR
# - LIFE_CANVAS_API_HOST
# - LIFE_CANVAS_API_PORT
# - LIFE_CANVAS_LOG_LEVEL
# - LIFE_CANVAS_LOG_FORMAT

[storage]
# Directory holding the state snapshot
data_dir = "~/.local/share/life-canvas"

# Snapshot key; the file is <data_dir>/<state_key>.json
state_key = "life-canvas-state"

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 8093

# Allowed CORS origins (empty allows any origin)
cors_origins = []

[backup]
# Backup archive directory (defaults to <data_dir>/backups)
# dir = "~/.local/share/life-canvas/backups"

# Archives older than this many days are pruned
retention_days = 7

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.state_key, "life-canvas-state");
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.api.port, 8093);
        assert_eq!(config.backup.retention_days, 7);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8093);
        assert_eq!(config.storage.state_key, "life-canvas-state");
        assert!(config.backup.dir.is_none());
        assert!(config.api.cors_origins.is_empty());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::parse("[api]\nport = 9000\n").unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nport = ").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LIFE_CANVAS_DATA_DIR", "/tmp/lc"),
            ("LIFE_CANVAS_API_PORT", "not-a-port"),
            ("LIFE_CANVAS_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/tmp/lc");
        assert_eq!(config.api.port, 8093);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.backup_dir(), PathBuf::from("/tmp/lc/backups"));
    }

    #[test]
    fn test_explicit_backup_dir() {
        let config = Config::parse("[backup]\ndir = \"/srv/backups\"\n").unwrap();
        assert_eq!(config.backup_dir(), PathBuf::from("/srv/backups"));
    }
}
