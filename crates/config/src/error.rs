//! Error types for settings storage.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings storage at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings storage is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings storage root must be a JSON object")]
    NotAnObject,

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
