//! The backend contract shared by Terminal.app and Warp, plus selection.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use claude_grid_core::{GridLayout, ScreenRect, SessionStore, WindowBounds, WindowRef};
use claude_grid_osa::{ScriptContext, ScriptRunner, sanitize};

use crate::error::BackendError;
use crate::terminal_app::TerminalAppBackend;
use crate::warp::WarpBackend;

/// Launched in every window unless the caller overrides it.
pub const DEFAULT_COMMAND: &str = "claude";

/// Everything a backend needs to open and place one batch of windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnOptions {
    pub count: usize,
    /// Empty means [`DEFAULT_COMMAND`].
    pub command: String,
    pub dir: String,
    /// Per-window override of `dir`, paired by index.
    pub dirs: Vec<String>,
    /// Per-window prompt, paired by index. Missing or empty means none.
    pub prompts: Vec<String>,
    pub grid: GridLayout,
    pub screen: ScreenRect,
    pub bounds: Vec<WindowBounds>,
    pub session_id: String,
}

impl SpawnOptions {
    /// Rejects requests that would fail before any window is touched.
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.count == 0 {
            return Err(BackendError::InvalidCount);
        }
        if self.bounds.len() < self.count {
            return Err(BackendError::InsufficientBounds {
                got: self.bounds.len(),
                need: self.count,
            });
        }
        Ok(())
    }

    pub fn command(&self) -> &str {
        if self.command.trim().is_empty() {
            DEFAULT_COMMAND
        } else {
            &self.command
        }
    }

    pub fn dir_for(&self, index: usize) -> &str {
        match self.dirs.get(index) {
            Some(dir) if !dir.trim().is_empty() => dir,
            _ => &self.dir,
        }
    }

    pub fn prompt_for(&self, index: usize) -> Option<&str> {
        self.prompts
            .get(index)
            .map(String::as_str)
            .filter(|p| !p.trim().is_empty())
    }

    /// Sanitized command for window `index`, with its prompt appended as a
    /// quoted argument. Ready to sit inside an AppleScript string literal.
    pub fn command_line(&self, index: usize) -> String {
        let command = sanitize(self.command());
        match self.prompt_for(index) {
            Some(prompt) => format!("{command} \\\"{}\\\"", sanitize(prompt)),
            None => command,
        }
    }
}

/// A window created by a successful spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Backend-native handle.
    pub id: String,
    /// 0-based grid position.
    pub index: usize,
    pub backend: &'static str,
}

impl From<&WindowInfo> for WindowRef {
    fn from(info: &WindowInfo) -> Self {
        WindowRef {
            id: info.id.clone(),
            index: info.index,
        }
    }
}

/// Uniform contract over structurally different automation targets.
///
/// `spawn_windows` is all-or-nothing: on error no partial window list is
/// returned and the caller owns cleanup. `close_windows` undoes a spawn whose
/// record was never written; `close_session` closes a recorded session. Both
/// are best-effort and only fail when they cannot reach the application or
/// cannot work out which windows to close.
pub trait TerminalBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn available(&self) -> bool;

    fn spawn_windows(
        &self,
        ctx: &ScriptContext,
        opts: &SpawnOptions,
    ) -> impl Future<Output = Result<Vec<WindowInfo>, BackendError>> + Send;

    fn close_windows(
        &self,
        ctx: &ScriptContext,
        windows: &[WindowInfo],
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn close_session(
        &self,
        ctx: &ScriptContext,
        session_id: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Warp,
    Terminal,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warp => "warp",
            Self::Terminal => "terminal",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warp" => Ok(Self::Warp),
            "terminal" => Ok(Self::Terminal),
            _ => Err(BackendError::Unsupported(s.to_string())),
        }
    }
}

/// Resolve a user preference to a backend kind.
///
/// `""` and `"auto"` prefer Warp when installed and fall back to Terminal.app;
/// naming a backend explicitly fails loud when it is unavailable.
pub fn select_kind(
    preference: &str,
    warp_available: bool,
    terminal_available: bool,
) -> Result<BackendKind, BackendError> {
    let pref = preference.trim().to_ascii_lowercase();
    match pref.as_str() {
        "" | "auto" => {
            if warp_available {
                Ok(BackendKind::Warp)
            } else if terminal_available {
                Ok(BackendKind::Terminal)
            } else {
                Err(BackendError::Unavailable {
                    backend: "terminal",
                    hint: "",
                })
            }
        }
        "warp" if warp_available => Ok(BackendKind::Warp),
        "warp" => Err(BackendError::Unavailable {
            backend: "warp",
            hint: ". Install Warp or use --terminal terminal",
        }),
        "terminal" if terminal_available => Ok(BackendKind::Terminal),
        "terminal" => Err(BackendError::Unavailable {
            backend: "terminal",
            hint: "",
        }),
        _ => Err(BackendError::Unsupported(preference.to_string())),
    }
}

/// Closed set of backends. The dispatcher only ever calls the contract.
pub enum Backend<R> {
    Terminal(TerminalAppBackend<R>),
    Warp(WarpBackend<R>),
}

impl<R: ScriptRunner> Backend<R> {
    /// Pick a backend from a user preference, probing the installed apps.
    pub fn select(preference: &str, runner: R, store: SessionStore) -> Result<Self, BackendError> {
        Self::select_from(preference, WarpBackend::new(runner), store)
    }

    /// Selection with a pre-built Warp backend, whose own availability
    /// check decides whether Warp is usable.
    pub fn select_from(
        preference: &str,
        warp: WarpBackend<R>,
        store: SessionStore,
    ) -> Result<Self, BackendError> {
        let kind = select_kind(preference, warp.available(), true)?;
        tracing::debug!("selected {kind} backend");
        Ok(match kind {
            BackendKind::Warp => Self::Warp(warp),
            BackendKind::Terminal => {
                Self::Terminal(TerminalAppBackend::new(warp.into_runner(), store))
            }
        })
    }

    /// Rebuild the backend a session was created with.
    pub fn for_kind(kind: BackendKind, runner: R, store: SessionStore) -> Self {
        match kind {
            BackendKind::Terminal => Self::Terminal(TerminalAppBackend::new(runner, store)),
            BackendKind::Warp => Self::Warp(WarpBackend::new(runner)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Terminal(_) => BackendKind::Terminal,
            Self::Warp(_) => BackendKind::Warp,
        }
    }
}

impl<R: ScriptRunner> TerminalBackend for Backend<R> {
    fn name(&self) -> &'static str {
        match self {
            Self::Terminal(b) => b.name(),
            Self::Warp(b) => b.name(),
        }
    }

    fn available(&self) -> bool {
        match self {
            Self::Terminal(b) => b.available(),
            Self::Warp(b) => b.available(),
        }
    }

    async fn spawn_windows(
        &self,
        ctx: &ScriptContext,
        opts: &SpawnOptions,
    ) -> Result<Vec<WindowInfo>, BackendError> {
        match self {
            Self::Terminal(b) => b.spawn_windows(ctx, opts).await,
            Self::Warp(b) => b.spawn_windows(ctx, opts).await,
        }
    }

    async fn close_windows(
        &self,
        ctx: &ScriptContext,
        windows: &[WindowInfo],
    ) -> Result<(), BackendError> {
        match self {
            Self::Terminal(b) => b.close_windows(ctx, windows).await,
            Self::Warp(b) => b.close_windows(ctx, windows).await,
        }
    }

    async fn close_session(&self, ctx: &ScriptContext, session_id: &str) -> Result<(), BackendError> {
        match self {
            Self::Terminal(b) => b.close_session(ctx, session_id).await,
            Self::Warp(b) => b.close_session(ctx, session_id).await,
        }
    }
}
