//! `claude-grid version` and `--version`.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Stamped by release builds; `unknown` otherwise.
pub fn commit() -> &'static str {
    option_env!("CLAUDE_GRID_COMMIT").unwrap_or("unknown")
}

pub fn build_date() -> &'static str {
    option_env!("CLAUDE_GRID_BUILD_DATE").unwrap_or("unknown")
}

pub fn short_version() -> String {
    format!(
        "claude-grid version {VERSION} (commit: {}, date: {})",
        commit(),
        build_date()
    )
}

pub fn long_version() -> String {
    format!(
        "claude-grid {VERSION} ({}/{}) commit:{} built:{}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        commit(),
        build_date()
    )
}
