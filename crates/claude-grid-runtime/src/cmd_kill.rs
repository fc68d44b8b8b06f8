//! `claude-grid kill <name>`: close a session's windows and forget it.

use std::path::Path;

use anyhow::{Context, anyhow};
use claude_grid_core::{SessionError, SessionRecord, SessionStore};
use claude_grid_osa::{OsaExecutor, ScriptContext};
use claude_grid_terminal::{Backend, BackendKind, TerminalBackend};

/// Load a record, turning "not found" into a pointer at `list`.
pub(crate) fn load_session(store: &SessionStore, name: &str) -> anyhow::Result<SessionRecord> {
    match store.load(name) {
        Ok(record) => Ok(record),
        Err(SessionError::NotFound(_)) => Err(anyhow!(
            "Session '{name}' not found. Run 'claude-grid list' to see active sessions."
        )),
        Err(e) => Err(e).with_context(|| format!("failed to load session '{name}'")),
    }
}

pub async fn cmd_kill(ctx: &ScriptContext, base_dir: &Path, name: &str) -> anyhow::Result<()> {
    let store = SessionStore::new(base_dir);
    let record = load_session(&store, name)?;
    let kind: BackendKind = record
        .backend
        .parse()
        .map_err(|_| anyhow!("unknown backend: {}", record.backend))?;
    let backend = Backend::for_kind(kind, OsaExecutor::new(), store.clone());

    let closed = kill_session(ctx, &backend, &store, &record).await;
    println!("{}", kill_summary(name, record.windows.len(), closed));
    Ok(())
}

fn kill_summary(name: &str, windows: usize, closed: bool) -> String {
    if closed {
        format!("Session '{name}' killed. {windows} windows closed.")
    } else {
        format!("Session '{name}' killed. Its windows could not be closed and may still be open.")
    }
}

/// Close windows then delete the record. Both steps only warn on failure.
/// Returns whether the windows were closed.
pub(crate) async fn kill_session<B: TerminalBackend>(
    ctx: &ScriptContext,
    backend: &B,
    store: &SessionStore,
    record: &SessionRecord,
) -> bool {
    let closed = match backend.close_session(ctx, &record.name).await {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Warning: failed to close windows: {e}");
            false
        }
    };
    if let Err(e) = store.delete(&record.name) {
        eprintln!("Warning: failed to delete session file: {e}");
    }
    closed
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use claude_grid_core::WindowRef;
    use claude_grid_terminal::{BackendError, SpawnOptions, WindowInfo};

    use super::*;

    /// Records closes; optionally fails spawns or closes.
    #[derive(Default)]
    pub(crate) struct FakeBackend {
        pub closed: Mutex<Vec<String>>,
        /// Window ids passed to each `close_windows` call.
        pub closed_windows: Mutex<Vec<Vec<String>>>,
        pub fail_spawn: bool,
        pub fail_close: bool,
    }

    impl TerminalBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn available(&self) -> bool {
            true
        }

        async fn spawn_windows(
            &self,
            _ctx: &ScriptContext,
            opts: &SpawnOptions,
        ) -> Result<Vec<WindowInfo>, BackendError> {
            if self.fail_spawn {
                return Err(BackendError::ConvergenceTimeout {
                    backend: "fake",
                    observed: 0,
                    expected: opts.count,
                });
            }
            Ok((0..opts.count)
                .map(|index| WindowInfo {
                    id: (index + 1).to_string(),
                    index,
                    backend: "fake",
                })
                .collect())
        }

        async fn close_windows(
            &self,
            _ctx: &ScriptContext,
            windows: &[WindowInfo],
        ) -> Result<(), BackendError> {
            self.closed_windows
                .lock()
                .expect("lock")
                .push(windows.iter().map(|w| w.id.clone()).collect());
            if self.fail_close {
                return Err(BackendError::InvalidCount);
            }
            Ok(())
        }

        async fn close_session(
            &self,
            _ctx: &ScriptContext,
            session_id: &str,
        ) -> Result<(), BackendError> {
            self.closed.lock().expect("lock").push(session_id.to_string());
            if self.fail_close {
                return Err(BackendError::InvalidCount);
            }
            Ok(())
        }
    }

    pub(crate) fn record(name: &str) -> SessionRecord {
        SessionRecord {
            name: name.into(),
            backend: "terminal".into(),
            count: 1,
            dir: "/repo".into(),
            dirs: vec!["/repo".into()],
            prompts: vec![String::new()],
            created_at: Utc::now(),
            windows: vec![WindowRef {
                id: "101".into(),
                index: 0,
            }],
            worktrees: Vec::new(),
            status: None,
            repo_path: None,
            manifest_path: None,
        }
    }

    #[test]
    fn missing_session_points_at_list() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(tmp.path());
        let err = load_session(&store, "grid-zzzz").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Session 'grid-zzzz' not found. Run 'claude-grid list' to see active sessions."
        );
    }

    #[tokio::test]
    async fn kill_closes_then_deletes() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(tmp.path());
        let rec = record("grid-0001");
        store.save(&rec).expect("save");

        let backend = FakeBackend::default();
        assert!(kill_session(&ScriptContext::new(), &backend, &store, &rec).await);

        assert_eq!(*backend.closed.lock().expect("lock"), vec!["grid-0001"]);
        assert!(matches!(store.load("grid-0001"), Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn kill_deletes_even_when_close_fails() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(tmp.path());
        let rec = record("grid-0002");
        store.save(&rec).expect("save");

        let backend = FakeBackend {
            fail_close: true,
            ..FakeBackend::default()
        };
        let closed = kill_session(&ScriptContext::new(), &backend, &store, &rec).await;
        assert!(!closed);
        assert!(store.load("grid-0002").is_err());
    }

    #[test]
    fn summary_reflects_close_outcome() {
        assert_eq!(
            kill_summary("grid-1", 3, true),
            "Session 'grid-1' killed. 3 windows closed."
        );
        let failed = kill_summary("grid-1", 3, false);
        assert!(!failed.contains("windows closed"), "{failed}");
        assert!(failed.contains("may still be open"));
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(tmp.path());
        let mut rec = record("grid-0003");
        rec.backend = "iterm".into();
        store.save(&rec).expect("save");

        let err = cmd_kill(&ScriptContext::new(), tmp.path(), "grid-0003")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown backend: iterm");
        assert!(store.load("grid-0003").is_ok());
    }
}
