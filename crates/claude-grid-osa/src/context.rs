//! Cancellation and deadline carrier threaded through every automation call.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::OsaError;

/// Caller context for automation work: a cancellation token plus an optional
/// deadline. Cloning shares the token; `with_timeout` derives a child whose
/// cancellation does not reach the parent.
#[derive(Debug, Clone, Default)]
pub struct ScriptContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ScriptContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Child context expiring after `timeout`, or at the parent's deadline if
    /// that comes first.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing <= deadline => existing,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// `Err` if the context is already cancelled or past its deadline.
    pub fn check(&self) -> Result<(), OsaError> {
        if self.token.is_cancelled() {
            return Err(OsaError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(OsaError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `fut` to completion unless the context is cancelled or expires
    /// first; the future is dropped in that case.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, OsaError> {
        self.check()?;
        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(OsaError::Cancelled),
            _ = expiry => Err(OsaError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }

    pub async fn sleep(&self, duration: Duration) -> Result<(), OsaError> {
        self.run(tokio::time::sleep(duration)).await
    }
}
