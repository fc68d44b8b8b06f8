//! `claude-grid list`: table of recorded sessions with a liveness check.

use std::path::Path;

use anyhow::Context;
use claude_grid_core::{SessionRecord, SessionStore};
use claude_grid_osa::{OsaExecutor, ScriptContext};
use claude_grid_terminal::session_is_live;

use crate::context::{collapse_home, format_table};

const HEADER: [&str; 6] = ["SESSION", "STATUS", "BACKEND", "WINDOWS", "DIR", "CREATED"];

pub async fn cmd_list(ctx: &ScriptContext, base_dir: &Path) -> anyhow::Result<()> {
    let store = SessionStore::new(base_dir);
    let sessions = store.list().context("failed to list sessions")?;
    if sessions.is_empty() {
        println!("No active sessions.");
        return Ok(());
    }

    let executor = OsaExecutor::new();
    let mut rows = Vec::with_capacity(sessions.len());
    for record in &sessions {
        let live = session_is_live(&executor, store.clone(), ctx, record).await;
        rows.push(session_row(record, live));
    }
    println!("{}", format_table(&HEADER, &rows));
    Ok(())
}

fn session_row(record: &SessionRecord, live: bool) -> Vec<String> {
    let mut status = record.display_status().to_string();
    if !live {
        status.push_str(" (stale)");
    }
    vec![
        record.name.clone(),
        status,
        record.backend.clone(),
        record.windows.len().to_string(),
        collapse_home(&record.dir),
        record
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
    ]
}
