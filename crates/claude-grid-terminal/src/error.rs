//! Error types for terminal backends.

use claude_grid_core::SessionError;
use claude_grid_osa::OsaError;
use thiserror::Error;

pub const ACCESSIBILITY_HINT: &str = "Accessibility permission required. Go to System Settings > Privacy & Security > Accessibility and add your terminal app";

/// Substring osascript reports when System Events access is denied.
const ASSISTIVE_ACCESS_DENIED: &str = "not allowed assistive access";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("window count must be positive")]
    InvalidCount,

    #[error("insufficient bounds: got {got}, need {need}")]
    InsufficientBounds { got: usize, need: usize },

    #[error("{context}: {source}")]
    Automation {
        context: &'static str,
        #[source]
        source: OsaError,
    },

    #[error("{context}: {source}: {hint}", hint = ACCESSIBILITY_HINT)]
    AccessibilityDenied {
        context: &'static str,
        #[source]
        source: OsaError,
    },

    #[error("timeout waiting for {backend} windows: got {observed}, want {expected}")]
    ConvergenceTimeout {
        backend: &'static str,
        observed: usize,
        expected: usize,
    },

    #[error("insufficient window ids: got {got}, need {need}")]
    MissingWindowIds { got: usize, need: usize },

    #[error("open {uri}: {detail}")]
    Launch { uri: String, detail: String },

    #[error("failed to load session {name:?}: {source}")]
    Session {
        name: String,
        #[source]
        source: SessionError,
    },

    #[error("{backend} backend is not available{hint}")]
    Unavailable {
        backend: &'static str,
        hint: &'static str,
    },

    #[error("unsupported terminal backend {0:?}. Available options: warp, terminal")]
    Unsupported(String),

    /// Cancellation or deadline from the caller's context, passed through.
    #[error(transparent)]
    Context(OsaError),
}

impl BackendError {
    /// Wrap a transport failure, keeping context errors distinguishable.
    pub fn automation(context: &'static str, source: OsaError) -> Self {
        if source.is_context() {
            Self::Context(source)
        } else {
            Self::Automation { context, source }
        }
    }

    /// Like [`BackendError::automation`], but a denied System Events call
    /// gains the accessibility remediation hint.
    pub fn ui_automation(context: &'static str, source: OsaError) -> Self {
        if source
            .to_string()
            .to_ascii_lowercase()
            .contains(ASSISTIVE_ACCESS_DENIED)
        {
            Self::AccessibilityDenied { context, source }
        } else {
            Self::automation(context, source)
        }
    }

    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context(_))
    }
}

impl From<OsaError> for BackendError {
    fn from(err: OsaError) -> Self {
        Self::automation("automation call failed", err)
    }
}
