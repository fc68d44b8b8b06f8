//! Terminal.app backend: one batched AppleScript creates, identifies and
//! positions every window.
//!
//! Ids are captured with `id of front window` right after each `do script`,
//! which relies on Terminal.app bringing the newest window to the front.
//! That is an observed focus behaviour, not a documented guarantee; any
//! change to the script must keep the capture immediately after creation.

use std::fmt::Write as _;

use claude_grid_core::SessionStore;
use claude_grid_osa::{OsaError, ScriptContext, ScriptRunner, sanitize};

use crate::backend::{SpawnOptions, TerminalBackend, WindowInfo};
use crate::error::BackendError;

const NAME: &str = "terminal";

pub const LIST_WINDOW_IDS_SCRIPT: &str = r#"tell application "Terminal" to get id of every window"#;

pub struct TerminalAppBackend<R> {
    runner: R,
    store: SessionStore,
}

impl<R: ScriptRunner> TerminalAppBackend<R> {
    pub fn new(runner: R, store: SessionStore) -> Self {
        Self { runner, store }
    }

    /// Close each window by id. Per-window failures only warn; cancellation
    /// and deadlines stop the loop.
    async fn close_ids<'a>(
        &self,
        ctx: &ScriptContext,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), BackendError> {
        for id in ids {
            // Ids are embedded unquoted; anything non-numeric is not ours.
            if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
                tracing::warn!("skipping terminal window with invalid id {id:?}");
                continue;
            }
            match self.runner.run_applescript(ctx, &close_window_script(id)).await {
                Ok(_) => {}
                Err(e @ (OsaError::Cancelled | OsaError::DeadlineExceeded)) => {
                    return Err(BackendError::Context(e));
                }
                Err(e) => tracing::warn!("close terminal window {id}: {e}"),
            }
        }
        Ok(())
    }

    /// True when any of `ids` is still an open Terminal.app window.
    pub async fn has_live_window(
        &self,
        ctx: &ScriptContext,
        ids: &[String],
    ) -> Result<bool, BackendError> {
        let output = self
            .runner
            .run_applescript(ctx, LIST_WINDOW_IDS_SCRIPT)
            .await
            .map_err(|e| BackendError::automation("list terminal windows", e))?;
        let open: Vec<&str> = output.split(", ").map(str::trim).collect();
        Ok(ids.iter().any(|id| open.contains(&id.as_str())))
    }
}

/// Build the single script that spawns all `opts.count` windows.
pub fn build_spawn_script(opts: &SpawnOptions) -> String {
    let mut script = String::from("tell application \"Terminal\"\n");

    for (i, bounds) in opts.bounds.iter().take(opts.count).enumerate() {
        let dir = opts.dir_for(i);
        let command = if dir.trim().is_empty() {
            opts.command_line(i)
        } else {
            format!("cd \\\"{}\\\" && {}", sanitize(dir), opts.command_line(i))
        };
        let _ = writeln!(script, "    do script \"{command}\"");
        let _ = writeln!(script, "    set windowID{i} to id of front window");
        let _ = writeln!(
            script,
            "    set bounds of window id windowID{i} to {{{}, {}, {}, {}}}",
            bounds.x,
            bounds.y,
            bounds.right(),
            bounds.bottom()
        );
    }

    let ids: Vec<String> = (0..opts.count)
        .map(|i| format!("(windowID{i} as text)"))
        .collect();
    let _ = writeln!(script, "    return {}", ids.join(" & \",\" & "));
    script.push_str("end tell");
    script
}

/// First `expected` non-empty comma-separated ids. Extra ids are ignored.
pub fn parse_window_ids(output: &str, expected: usize) -> Result<Vec<String>, BackendError> {
    let ids: Vec<String> = output
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if ids.len() < expected {
        return Err(BackendError::MissingWindowIds {
            got: ids.len(),
            need: expected,
        });
    }
    Ok(ids.into_iter().take(expected).collect())
}

fn close_window_script(id: &str) -> String {
    format!(
        "tell application \"Terminal\"\n    try\n        close window id {id}\n    on error\n    end try\nend tell"
    )
}

impl<R: ScriptRunner> TerminalBackend for TerminalAppBackend<R> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn available(&self) -> bool {
        true
    }

    async fn spawn_windows(
        &self,
        ctx: &ScriptContext,
        opts: &SpawnOptions,
    ) -> Result<Vec<WindowInfo>, BackendError> {
        opts.validate()?;

        let script = build_spawn_script(opts);
        tracing::debug!("spawning {} terminal windows", opts.count);
        let output = self
            .runner
            .run_applescript(ctx, &script)
            .await
            .map_err(|e| BackendError::automation("spawn terminal windows", e))?;

        let ids = parse_window_ids(&output, opts.count)?;
        Ok(ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| WindowInfo {
                id,
                index,
                backend: NAME,
            })
            .collect())
    }

    async fn close_windows(
        &self,
        ctx: &ScriptContext,
        windows: &[WindowInfo],
    ) -> Result<(), BackendError> {
        let ids: Vec<&str> = windows.iter().map(|w| w.id.as_str()).collect();
        self.close_ids(ctx, ids).await
    }

    async fn close_session(&self, ctx: &ScriptContext, session_id: &str) -> Result<(), BackendError> {
        let record = self
            .store
            .load(session_id)
            .map_err(|source| BackendError::Session {
                name: session_id.to_string(),
                source,
            })?;

        let ids: Vec<&str> = record.windows.iter().map(|w| w.id.as_str()).collect();
        self.close_ids(ctx, ids).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use claude_grid_core::{SessionRecord, WindowRef};

    use super::*;
    use crate::backend::test_support::{MockRunner, two_window_opts};

    fn backend(runner: MockRunner) -> (TerminalAppBackend<MockRunner>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(tmp.path());
        (TerminalAppBackend::new(runner, store), tmp)
    }

    fn record(name: &str, ids: &[&str]) -> SessionRecord {
        SessionRecord {
            name: name.into(),
            backend: NAME.into(),
            count: ids.len(),
            dir: "/repo".into(),
            dirs: Vec::new(),
            prompts: Vec::new(),
            created_at: Utc::now(),
            windows: ids
                .iter()
                .enumerate()
                .map(|(index, id)| WindowRef {
                    id: (*id).into(),
                    index,
                })
                .collect(),
            worktrees: Vec::new(),
            status: None,
            repo_path: None,
            manifest_path: None,
        }
    }

    #[test]
    fn spawn_script_shape() {
        let script = build_spawn_script(&two_window_opts());
        assert_eq!(script.matches("do script").count(), 2);
        assert_eq!(script.matches("id of front window").count(), 2);
        assert!(script.contains("set bounds of window id windowID0 to {0, 0, 800, 600}"));
        assert!(script.contains("set bounds of window id windowID1 to {800, 0, 1600, 600}"));
        assert!(script.contains(r#"do script "cd \"/repo\" && claude""#));
        assert!(script.starts_with("tell application \"Terminal\"\n"));
        assert!(script.ends_with("end tell"));
        assert!(script.contains(r#"return (windowID0 as text) & "," & (windowID1 as text)"#));
    }

    #[test]
    fn spawn_script_embeds_sanitized_dir_and_prompt() {
        let mut opts = two_window_opts();
        opts.dirs = vec!["/tmp/a\"b".into()];
        opts.prompts = vec![String::new(), "say $(hi)".into()];
        let script = build_spawn_script(&opts);
        assert!(script.contains(r#"do script "cd \"/tmp/a\"b\" && claude""#));
        assert!(script.contains(r#"do script "cd \"/repo\" && claude \"say \$(hi)\"""#));
    }

    #[test]
    fn spawn_script_without_dir_runs_bare_command() {
        let mut opts = two_window_opts();
        opts.dir = String::new();
        let script = build_spawn_script(&opts);
        assert!(script.contains("do script \"claude\"\n"));
        assert!(!script.contains("cd "));
    }

    #[test]
    fn parse_ids_takes_first_n() {
        assert_eq!(
            parse_window_ids(" 101, 102 ,103\n", 2).expect("ids"),
            vec!["101", "102"]
        );
        assert_eq!(parse_window_ids("7,,8", 2).expect("ids"), vec!["7", "8"]);
        assert!(matches!(
            parse_window_ids("101,", 2),
            Err(BackendError::MissingWindowIds { got: 1, need: 2 })
        ));
    }

    #[tokio::test]
    async fn spawn_returns_window_infos() {
        let (backend, _tmp) = backend(MockRunner::ok("101,102"));
        let windows = backend
            .spawn_windows(&ScriptContext::new(), &two_window_opts())
            .await
            .expect("spawn");
        assert_eq!(
            windows,
            vec![
                WindowInfo {
                    id: "101".into(),
                    index: 0,
                    backend: "terminal"
                },
                WindowInfo {
                    id: "102".into(),
                    index: 1,
                    backend: "terminal"
                },
            ]
        );
        assert_eq!(backend.runner.scripts().len(), 1);
    }

    #[tokio::test]
    async fn spawn_with_too_few_ids_fails() {
        let (backend, _tmp) = backend(MockRunner::ok("101"));
        let err = backend
            .spawn_windows(&ScriptContext::new(), &two_window_opts())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::MissingWindowIds { got: 1, need: 2 }));
    }

    #[tokio::test]
    async fn spawn_validates_before_running_anything() {
        let (backend, _tmp) = backend(MockRunner::ok("1"));
        let mut opts = two_window_opts();
        opts.bounds.clear();
        assert!(backend.spawn_windows(&ScriptContext::new(), &opts).await.is_err());
        assert!(backend.runner.scripts().is_empty());
    }

    #[tokio::test]
    async fn close_swallows_per_window_failures() {
        let runner = MockRunner::ok("")
            .queue(Err(OsaError::ScriptFailed {
                status: "exit 1".into(),
                output: "gone".into(),
            }))
            .queue(Ok(String::new()));
        let (backend, _tmp) = backend(runner);
        backend
            .store
            .save(&record("grid-1", &["101", "x; do shell script", "102"]))
            .expect("save");

        backend
            .close_session(&ScriptContext::new(), "grid-1")
            .await
            .expect("close");

        let scripts = backend.runner.scripts();
        assert_eq!(scripts.len(), 2);
        assert!(scripts[0].contains("close window id 101"));
        assert!(scripts[1].contains("close window id 102"));
        assert!(scripts[0].contains("on error"));
    }

    #[tokio::test]
    async fn unsaved_spawn_can_be_closed_by_window_list() {
        let (backend, _tmp) = backend(MockRunner::ok("101,102"));
        let ctx = ScriptContext::new();
        let windows = backend
            .spawn_windows(&ctx, &two_window_opts())
            .await
            .expect("spawn");

        backend.close_windows(&ctx, &windows).await.expect("close");

        let scripts = backend.runner.scripts();
        assert_eq!(scripts.len(), 3);
        assert!(scripts[1].contains("close window id 101"));
        assert!(scripts[2].contains("close window id 102"));
    }

    #[tokio::test]
    async fn close_windows_stops_on_cancel() {
        let (backend, _tmp) = backend(MockRunner::ok(""));
        let ctx = ScriptContext::new();
        ctx.cancel();
        let windows = vec![WindowInfo {
            id: "101".into(),
            index: 0,
            backend: NAME,
        }];
        let err = backend.close_windows(&ctx, &windows).await.unwrap_err();
        assert!(matches!(err, BackendError::Context(OsaError::Cancelled)));
        assert!(backend.runner.scripts().is_empty());
    }

    #[tokio::test]
    async fn close_unknown_session_fails() {
        let (backend, _tmp) = backend(MockRunner::ok(""));
        let err = backend
            .close_session(&ScriptContext::new(), "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Session { .. }));
    }

    #[tokio::test]
    async fn liveness_matches_recorded_ids() {
        let (backend, _tmp) = backend(MockRunner::ok("55, 102, 7"));
        let ctx = ScriptContext::new();
        assert!(backend
            .has_live_window(&ctx, &["101".into(), "102".into()])
            .await
            .expect("live"));
        assert!(!backend
            .has_live_window(&ctx, &["101".into()])
            .await
            .expect("live"));
    }
}
