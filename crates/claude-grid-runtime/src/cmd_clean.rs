//! `claude-grid clean <name>`: remove a session's worktrees and its record.

use std::path::Path;

use anyhow::{Context, bail};
use claude_grid_core::{SessionStore, WorktreeRef};

use crate::cmd_kill::load_session;
use crate::worktree::{WorktreeManager, is_dirty};

#[derive(Debug, Default)]
pub(crate) struct CleanReport {
    pub removed: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

pub fn cmd_clean(base_dir: &Path, name: &str) -> anyhow::Result<()> {
    let store = SessionStore::new(base_dir);
    let record = load_session(&store, name)?;
    if record.worktrees.is_empty() {
        bail!("session '{name}' has no worktrees to clean");
    }

    let repo = record.repo_path.as_deref().unwrap_or(".");
    let manager = WorktreeManager::new(Path::new(repo), base_dir.join("worktrees"))
        .with_context(|| format!("failed to create git manager for {repo:?}"))?;

    let report = remove_worktrees(&manager, &record.worktrees);

    if let Err(e) = store.delete(name) {
        eprintln!("Warning: failed to delete session file: {e}");
    }
    for warning in &report.warnings {
        eprintln!("Warning: {warning}");
    }
    println!(
        "Session '{name}' cleaned. {}/{} worktrees removed.",
        report.removed,
        record.worktrees.len()
    );

    if !report.errors.is_empty() {
        bail!("clean completed with errors: {}", report.errors.join("; "));
    }
    Ok(())
}

/// Remove every worktree, collecting failures instead of stopping, then prune.
pub(crate) fn remove_worktrees(manager: &WorktreeManager, worktrees: &[WorktreeRef]) -> CleanReport {
    let mut report = CleanReport::default();
    for wt in worktrees {
        let path = Path::new(&wt.path);
        if is_dirty(path) {
            report.warnings.push(format!(
                "worktree {:?} ({}) has uncommitted changes",
                wt.path, wt.branch
            ));
        }
        match manager.remove(path) {
            Ok(()) => report.removed += 1,
            Err(e) => report
                .errors
                .push(format!("failed to remove worktree {:?}: {e}", wt.path)),
        }
    }
    if let Err(e) = manager.prune() {
        report.errors.push(format!("failed to prune: {e}"));
    }
    report
}
