//! Error types for watch setup and configuration

use std::path::PathBuf;
use thiserror::Error;

/// Failure to establish a watch
///
/// These never escape the backend API (which reports `bool`), but are logged
/// at the boundary so the cause is visible.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watch path is empty")]
    EmptyPath,

    #[error("watch target does not exist: {}", .0.display())]
    Missing(PathBuf),

    #[error("watch target is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to acquire native watch handle: {0}")]
    Native(#[from] notify::Error),

    #[error("failed to spawn listener thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Failure to load or validate a [`WatcherConfig`](crate::config::WatcherConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
