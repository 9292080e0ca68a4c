//! Error types for sight queries and configuration loading.

use std::path::PathBuf;

/// Failures surfaced by the query layer. "Not visible" is never an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SightError {
    #[error("Entity {0} not found, cannot trace line of sight")]
    UnknownEntity(u32),
    #[error("Sight line from ({from_x}, {from_y}) failed to reach ({to_x}, {to_y}) within {limit} tiles")]
    LineTruncated {
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
        limit: usize,
    },
}

/// Failures while loading or installing a [`crate::SightConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported config format '{0}', expected .ron or .json")]
    UnsupportedFormat(String),
    #[error("Sight config already installed")]
    AlreadyInstalled,
}
