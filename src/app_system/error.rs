use thiserror::Error;

use crate::error::StoreError;

/// Failures while starting or stopping the store.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Startup failed: {0}")]
    Startup(#[from] StoreError),
    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}
