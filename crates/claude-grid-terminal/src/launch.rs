//! Process-launch and sleep seams for the Warp backend.
//! Real implementations shell out to `open` and sleep on the tokio timer;
//! tests swap both for recording fakes.

use std::future::Future;
use std::time::Duration;

use claude_grid_osa::{OsaError, ScriptContext};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::BackendError;

/// Bytes left untouched in a path segment, plus `/` which stays readable.
const PATH_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@')
    .remove(b'/');

/// `<scheme>://action/new_window?path=<path>` with everything but slashes
/// and path-safe punctuation percent-encoded.
pub fn new_window_uri(scheme: &str, path: &str) -> String {
    format!(
        "{scheme}://action/new_window?path={}",
        utf8_percent_encode(path, PATH_KEEP)
    )
}

/// Hands a URI to the OS.
pub trait UriLauncher: Send + Sync {
    fn open(
        &self,
        ctx: &ScriptContext,
        uri: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// `open <uri>`.
#[derive(Debug, Clone, Default)]
pub struct OpenLauncher;

impl UriLauncher for OpenLauncher {
    async fn open(&self, ctx: &ScriptContext, uri: &str) -> Result<(), BackendError> {
        let mut cmd = tokio::process::Command::new("open");
        cmd.arg(uri).kill_on_drop(true);

        let output = ctx
            .run(cmd.output())
            .await
            .map_err(BackendError::Context)?
            .map_err(|e| BackendError::Launch {
                uri: uri.to_string(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(BackendError::Launch {
                uri: uri.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Cancellable delay.
pub trait Sleeper: Send + Sync {
    fn sleep(
        &self,
        ctx: &ScriptContext,
        duration: Duration,
    ) -> impl Future<Output = Result<(), OsaError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, ctx: &ScriptContext, duration: Duration) -> Result<(), OsaError> {
        ctx.sleep(duration).await
    }
}
