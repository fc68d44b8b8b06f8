//! Error types for the automation transport.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OsaError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("osascript execution failed: {status} (output: {output})")]
    ScriptFailed { status: String, output: String },

    #[error("osascript io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected script output {output:?}: {detail}")]
    Parse { output: String, detail: String },
}

impl OsaError {
    pub fn parse(output: &str, detail: impl Into<String>) -> Self {
        Self::Parse {
            output: output.to_string(),
            detail: detail.into(),
        }
    }

    /// True for the two context errors, which callers propagate untouched.
    pub fn is_context(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
