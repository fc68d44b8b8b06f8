//! claude-grid-terminal: spawn, tile and close terminal windows.
//!
//! Two automation targets sit behind [`TerminalBackend`]: Terminal.app,
//! which is scriptable and reports window ids synchronously, and Warp,
//! which is only reachable through URI launches plus System Events UI
//! automation and has to be polled until its windows appear.

pub mod backend;
pub mod error;
pub mod launch;
pub mod liveness;
pub mod terminal_app;
pub mod warp;

pub use backend::{
    Backend, BackendKind, DEFAULT_COMMAND, SpawnOptions, TerminalBackend, WindowInfo, select_kind,
};
pub use error::{ACCESSIBILITY_HINT, BackendError};
pub use launch::{OpenLauncher, Sleeper, TokioSleeper, UriLauncher, new_window_uri};
pub use liveness::session_is_live;
pub use terminal_app::TerminalAppBackend;
pub use warp::{PollConfig, WarpBackend, WarpTiming};
