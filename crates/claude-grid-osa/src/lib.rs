//! claude-grid-osa: macOS automation IO boundary.
//! Runs AppleScript/JXA through `osascript`, escapes user data for embedding
//! in scripts, and locates the screen to tile into. No layout logic.

pub mod context;
pub mod error;
pub mod executor;
pub mod sanitize;
pub mod screen;

pub use context::ScriptContext;
pub use error::OsaError;
pub use executor::{DEFAULT_TIMEOUT, OsaExecutor, ScriptLanguage, ScriptRunner};
pub use sanitize::sanitize;
pub use screen::{DockEdge, ScreenLocator};
