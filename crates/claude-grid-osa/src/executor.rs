//! ScriptRunner trait and OsaExecutor (`osascript` subprocess wrapper).
//! The trait is the mock seam for every component that talks to the OS.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::context::ScriptContext;
use crate::error::OsaError;

/// Applied when the caller's context carries no deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLanguage {
    AppleScript,
    /// JavaScript for Automation.
    JavaScript,
}

/// Executes an automation script and returns its trimmed textual result.
pub trait ScriptRunner: Send + Sync {
    fn run(
        &self,
        ctx: &ScriptContext,
        language: ScriptLanguage,
        script: &str,
    ) -> impl Future<Output = Result<String, OsaError>> + Send;

    fn run_applescript(
        &self,
        ctx: &ScriptContext,
        script: &str,
    ) -> impl Future<Output = Result<String, OsaError>> + Send {
        self.run(ctx, ScriptLanguage::AppleScript, script)
    }
}

impl<T: ScriptRunner + ?Sized> ScriptRunner for &T {
    fn run(
        &self,
        ctx: &ScriptContext,
        language: ScriptLanguage,
        script: &str,
    ) -> impl Future<Output = Result<String, OsaError>> + Send {
        (**self).run(ctx, language, script)
    }
}

impl<T: ScriptRunner + ?Sized> ScriptRunner for Arc<T> {
    fn run(
        &self,
        ctx: &ScriptContext,
        language: ScriptLanguage,
        script: &str,
    ) -> impl Future<Output = Result<String, OsaError>> + Send {
        (**self).run(ctx, language, script)
    }
}

/// Real executor. Each call spawns a fresh `osascript`, so the executor is
/// freely cloneable and holds no child handle between calls.
#[derive(Debug, Clone)]
pub struct OsaExecutor {
    osascript_bin: String,
    timeout: Duration,
}

impl OsaExecutor {
    pub fn new() -> Self {
        Self {
            osascript_bin: "osascript".into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_bin(mut self, bin: impl Into<String>) -> Self {
        self.osascript_bin = bin.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for OsaExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRunner for OsaExecutor {
    async fn run(
        &self,
        ctx: &ScriptContext,
        language: ScriptLanguage,
        script: &str,
    ) -> Result<String, OsaError> {
        let ctx = match ctx.deadline() {
            Some(_) => ctx.clone(),
            None => ctx.with_timeout(self.timeout),
        };

        let mut cmd = tokio::process::Command::new(&self.osascript_bin);
        if language == ScriptLanguage::JavaScript {
            cmd.args(["-l", "JavaScript"]);
        }
        cmd.arg("-e").arg(script).kill_on_drop(true);

        let output = ctx.run(cmd.output()).await??;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let combined = format!("{}{}", stdout, stderr);
            let status = output
                .status
                .code()
                .map(|c| format!("exit {c}"))
                .unwrap_or_else(|| "signal".into());
            tracing::debug!("osascript failed ({status}): {}", combined.trim());
            return Err(OsaError::ScriptFailed {
                status,
                output: combined.trim().to_string(),
            });
        }

        Ok(stdout.trim().to_string())
    }
}
