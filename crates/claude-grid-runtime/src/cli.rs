//! CLI definition using clap derive.

use clap::{Parser, Subcommand};

/// Upper bound on windows per session.
pub const MAX_COUNT: usize = 16;

#[derive(Parser, Debug)]
#[command(
    name = "claude-grid",
    about = "Spawn a tiled grid of Claude Code sessions",
    args_conflicts_with_subcommands = true,
    allow_negative_numbers = true
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Print version information
    #[arg(long, global = true)]
    pub version: bool,

    #[command(flatten)]
    pub spawn: SpawnOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all sessions
    List,
    /// Kill a session and close all its windows
    Kill {
        /// Session name
        name: String,
    },
    /// Clean a session by removing its worktrees
    Clean {
        /// Session name
        name: String,
    },
    /// Show version information
    Version,
}

#[derive(clap::Args, Debug, Default)]
pub struct SpawnOpts {
    /// Number of windows (1-16); inferred from --dir when omitted
    #[arg(value_name = "COUNT")]
    pub count: Option<String>,

    /// Terminal backend: terminal, warp (default: auto-detect)
    #[arg(long, short = 't', env = "CLAUDE_GRID_TERMINAL", default_value = "")]
    pub terminal: String,

    /// Working directory (repeatable); infers count
    #[arg(long = "dir", short = 'd', value_name = "DIR")]
    pub dirs: Vec<String>,

    /// Per-instance prompt (repeatable; paired with --dir by index)
    #[arg(long = "prompt", value_name = "PROMPT")]
    pub prompts: Vec<String>,

    /// YAML manifest file defining instances
    #[arg(long, short = 'M')]
    pub manifest: Option<String>,

    /// Session name (default: auto-generated)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Grid layout, e.g. 2x3 (default: auto)
    #[arg(long, short = 'l')]
    pub layout: Option<String>,

    /// Create a git worktree for each window
    #[arg(long, short = 'w')]
    pub worktrees: bool,

    /// Branch prefix for worktrees (default: auto-generated)
    #[arg(long, short = 'b')]
    pub branch_prefix: Option<String>,
}
