//! claude-grid: spawn a tiled grid of Claude Code terminal windows.

use clap::Parser;
use claude_grid_osa::ScriptContext;

mod branch;
mod cli;
mod cmd_clean;
mod cmd_kill;
mod cmd_list;
mod cmd_spawn;
mod cmd_version;
mod context;
mod manifest;
mod pathutil;
mod worktree;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = std::env::var("CLAUDE_GRID_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    init_tracing(args.verbose);

    let ctx = ScriptContext::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling");
            interrupt.cancel();
        }
    });

    let base_dir = claude_grid_core::default_base_dir();

    if args.version {
        println!("{}", cmd_version::short_version());
        return Ok(());
    }

    match args.command {
        Some(cli::Command::List) => cmd_list::cmd_list(&ctx, &base_dir).await?,
        Some(cli::Command::Kill { name }) => cmd_kill::cmd_kill(&ctx, &base_dir, &name).await?,
        Some(cli::Command::Clean { name }) => cmd_clean::cmd_clean(&base_dir, &name)?,
        Some(cli::Command::Version) => println!("{}", cmd_version::long_version()),
        None => cmd_spawn::cmd_spawn(&ctx, &base_dir, &args.spawn, args.verbose).await?,
    }

    Ok(())
}
