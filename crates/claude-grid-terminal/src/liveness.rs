//! Best-effort check that a recorded session still has windows open.

use claude_grid_core::{SessionRecord, SessionStore};
use claude_grid_osa::{ScriptContext, ScriptRunner};

use crate::backend::BackendKind;
use crate::terminal_app::TerminalAppBackend;
use crate::warp::WarpBackend;

/// Terminal.app sessions are live while any recorded window id is open; Warp
/// sessions while Warp has any window at all. Probe failures count as stale,
/// and records from an unknown backend are assumed live.
pub async fn session_is_live<R: ScriptRunner>(
    runner: R,
    store: SessionStore,
    ctx: &ScriptContext,
    record: &SessionRecord,
) -> bool {
    let Ok(kind) = record.backend.parse::<BackendKind>() else {
        return true;
    };
    let probe = match kind {
        BackendKind::Terminal => {
            let ids: Vec<String> = record.windows.iter().map(|w| w.id.clone()).collect();
            TerminalAppBackend::new(runner, store)
                .has_live_window(ctx, &ids)
                .await
        }
        BackendKind::Warp => WarpBackend::new(runner)
            .window_count(ctx)
            .await
            .map(|n| n > 0),
    };
    match probe {
        Ok(live) => live,
        Err(e) => {
            tracing::debug!("liveness probe for {} failed: {e}", record.name);
            false
        }
    }
}
