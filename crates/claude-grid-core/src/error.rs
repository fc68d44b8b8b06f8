//! Error types for grid geometry and session persistence.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid layout format: {0:?} (expected RxC)")]
    InvalidFormat(String),

    #[error("invalid {axis} value: {value:?}")]
    InvalidNumber { axis: &'static str, value: String },

    #[error("rows and cols must be positive (got {rows}x{cols})")]
    NonPositive { rows: i64, cols: i64 },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0:?} not found")]
    NotFound(String),

    #[error("invalid session name {0:?}: must not contain '/', '\\' or '..'")]
    InvalidName(String),

    #[error("session io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed session file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
