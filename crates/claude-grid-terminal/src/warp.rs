//! Warp backend. Warp has no scripting dictionary, so windows are opened
//! through its URI scheme and everything else goes through System Events:
//! wait for the window count to converge, tile by native index, then raise
//! each window and type its command, one window at a time.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use claude_grid_core::WindowBounds;
use claude_grid_osa::{OsaError, ScriptContext, ScriptRunner};
use tokio::time::Instant;

use crate::backend::{SpawnOptions, TerminalBackend, WindowInfo};
use crate::error::BackendError;
use crate::launch::{OpenLauncher, Sleeper, TokioSleeper, UriLauncher, new_window_uri};

const NAME: &str = "warp";

pub const WARP_APP_PATH: &str = "/Applications/Warp.app";
pub const WARP_URI_SCHEME: &str = "warp";

pub const IS_RUNNING_SCRIPT: &str =
    r#"tell application "System Events" to (name of processes) contains "Warp""#;
pub const COUNT_WINDOWS_SCRIPT: &str =
    r#"tell application "System Events" to tell process "Warp" to count windows"#;
const CLOSE_ALL_SCRIPT: &str = r#"tell application "System Events"
    tell process "Warp"
        repeat while (count windows) > 0
            close window 1
        end repeat
    end tell
end tell"#;

/// Exponential backoff for the window-count poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub initial: Duration,
    pub max: Duration,
    /// Hard wall-clock limit for the whole poll.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(1),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpTiming {
    /// Between consecutive launch requests, so Warp does not coalesce them.
    pub spawn_delay: Duration,
    /// After launching a Warp that was not running yet.
    pub fresh_launch_delay: Duration,
    /// Between raising a window and typing into it.
    pub raise_settle: Duration,
    /// After typing into one window and before raising the next.
    pub inject_delay: Duration,
}

impl Default for WarpTiming {
    fn default() -> Self {
        Self {
            spawn_delay: Duration::from_millis(500),
            fresh_launch_delay: Duration::from_secs(3),
            raise_settle: Duration::from_millis(300),
            inject_delay: Duration::from_millis(200),
        }
    }
}

type AppProbe = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

pub struct WarpBackend<R, L = OpenLauncher, S = TokioSleeper> {
    runner: R,
    launcher: L,
    sleeper: S,
    app_probe: AppProbe,
    poll: PollConfig,
    timing: WarpTiming,
}

impl<R: ScriptRunner> WarpBackend<R> {
    pub fn new(runner: R) -> Self {
        Self::with_parts(runner, OpenLauncher, TokioSleeper)
    }
}

impl<R, L, S> WarpBackend<R, L, S>
where
    R: ScriptRunner,
    L: UriLauncher,
    S: Sleeper,
{
    pub fn with_parts(runner: R, launcher: L, sleeper: S) -> Self {
        Self {
            runner,
            launcher,
            sleeper,
            app_probe: Arc::new(|path: &Path| path.exists()),
            poll: PollConfig::default(),
            timing: WarpTiming::default(),
        }
    }

    #[must_use]
    pub fn with_app_probe(mut self, probe: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        self.app_probe = Arc::new(probe);
        self
    }

    #[must_use]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: WarpTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    async fn applescript(
        &self,
        ctx: &ScriptContext,
        context: &'static str,
        script: &str,
    ) -> Result<String, BackendError> {
        self.runner
            .run_applescript(ctx, script)
            .await
            .map_err(|e| BackendError::ui_automation(context, e))
    }

    async fn sleep(&self, ctx: &ScriptContext, duration: Duration) -> Result<(), BackendError> {
        self.sleeper
            .sleep(ctx, duration)
            .await
            .map_err(BackendError::Context)
    }

    async fn is_running(&self, ctx: &ScriptContext) -> Result<bool, BackendError> {
        let output = self
            .applescript(ctx, "check warp process", IS_RUNNING_SCRIPT)
            .await?;
        Ok(output.trim() == "true")
    }

    /// Current number of Warp windows.
    pub async fn window_count(&self, ctx: &ScriptContext) -> Result<usize, BackendError> {
        let output = self
            .applescript(ctx, "count warp windows", COUNT_WINDOWS_SCRIPT)
            .await?;
        output.trim().parse().map_err(|_| {
            BackendError::automation(
                "count warp windows",
                OsaError::parse(&output, "expected a window count"),
            )
        })
    }

    async fn launch_windows(&self, ctx: &ScriptContext, opts: &SpawnOptions) -> Result<(), BackendError> {
        for i in 0..opts.count {
            let uri = new_window_uri(WARP_URI_SCHEME, opts.dir_for(i));
            tracing::debug!("opening {uri}");
            self.launcher.open(ctx, &uri).await?;
            if i + 1 < opts.count {
                self.sleep(ctx, self.timing.spawn_delay).await?;
            }
        }
        Ok(())
    }

    /// Poll until Warp reports at least `target` windows. Returns the number
    /// of polls it took.
    pub async fn wait_for_window_count(
        &self,
        ctx: &ScriptContext,
        target: usize,
    ) -> Result<usize, BackendError> {
        let deadline = Instant::now() + self.poll.timeout;
        let mut delay = self.poll.initial;
        let mut polls = 0;

        loop {
            ctx.check().map_err(BackendError::Context)?;
            let count = self.window_count(ctx).await?;
            polls += 1;
            if count >= target {
                tracing::debug!("warp reached {count} windows after {polls} polls");
                return Ok(polls);
            }
            if Instant::now() >= deadline {
                return Err(BackendError::ConvergenceTimeout {
                    backend: NAME,
                    observed: count,
                    expected: target,
                });
            }
            self.sleep(ctx, delay).await?;
            delay = (delay * 2).min(self.poll.max);
        }
    }

    async fn tile_windows(&self, ctx: &ScriptContext, bounds: &[WindowBounds]) -> Result<(), BackendError> {
        self.applescript(ctx, "tile warp windows", &build_tile_script(bounds))
            .await
            .map(drop)
    }

    /// One raise and one typing script per window, with the pauses taken
    /// through the sleeper so an interrupt stops the sequence between windows.
    async fn send_commands(&self, ctx: &ScriptContext, opts: &SpawnOptions) -> Result<(), BackendError> {
        for i in 0..opts.count {
            ctx.check().map_err(BackendError::Context)?;
            self.applescript(ctx, "raise warp window", &build_raise_script(i + 1))
                .await?;
            self.sleep(ctx, self.timing.raise_settle).await?;
            self.applescript(ctx, "send command to warp", &build_type_script(opts, i))
                .await?;
            if i + 1 < opts.count {
                self.sleep(ctx, self.timing.inject_delay).await?;
            }
        }
        Ok(())
    }
}

/// Position and size Warp windows `1..=bounds.len()` in native index order.
pub fn build_tile_script(bounds: &[WindowBounds]) -> String {
    let mut script = String::from("tell application \"System Events\"\n    tell process \"Warp\"\n");
    for (i, b) in bounds.iter().enumerate() {
        let n = i + 1;
        let _ = writeln!(script, "        set position of window {n} to {{{}, {}}}", b.x, b.y);
        let _ = writeln!(script, "        set size of window {n} to {{{}, {}}}", b.width, b.height);
    }
    script.push_str("    end tell\nend tell");
    script
}

/// Bring Warp to the front with window `n` (1-based) on top.
pub fn build_raise_script(n: usize) -> String {
    format!(
        "tell application \"System Events\"\n    tell process \"Warp\"\n        set frontmost to true\n        perform action \"AXRaise\" of window {n}\n    end tell\nend tell"
    )
}

/// Type window `index`'s command line into the frontmost window, then return.
pub fn build_type_script(opts: &SpawnOptions, index: usize) -> String {
    format!(
        "tell application \"System Events\"\n    tell process \"Warp\"\n        keystroke \"{}\"\n        keystroke return\n    end tell\nend tell",
        opts.command_line(index)
    )
}

impl<R, L, S> TerminalBackend for WarpBackend<R, L, S>
where
    R: ScriptRunner,
    L: UriLauncher,
    S: Sleeper,
{
    fn name(&self) -> &'static str {
        NAME
    }

    fn available(&self) -> bool {
        (self.app_probe)(Path::new(WARP_APP_PATH))
    }

    async fn spawn_windows(
        &self,
        ctx: &ScriptContext,
        opts: &SpawnOptions,
    ) -> Result<Vec<WindowInfo>, BackendError> {
        opts.validate()?;

        let was_running = self.is_running(ctx).await?;
        self.launch_windows(ctx, opts).await?;
        if !was_running {
            tracing::debug!("warp was not running, waiting for first launch");
            self.sleep(ctx, self.timing.fresh_launch_delay).await?;
        }

        self.wait_for_window_count(ctx, opts.count).await?;
        self.tile_windows(ctx, &opts.bounds[..opts.count]).await?;
        self.send_commands(ctx, opts).await?;

        Ok((0..opts.count)
            .map(|index| WindowInfo {
                id: (index + 1).to_string(),
                index,
                backend: NAME,
            })
            .collect())
    }

    /// Warp windows have no stable ids, so this closes every Warp window.
    async fn close_windows(
        &self,
        ctx: &ScriptContext,
        windows: &[WindowInfo],
    ) -> Result<(), BackendError> {
        tracing::debug!("closing all warp windows ({} spawned)", windows.len());
        self.applescript(ctx, "close warp windows", CLOSE_ALL_SCRIPT)
            .await
            .map(drop)
    }

    async fn close_session(&self, ctx: &ScriptContext, session_id: &str) -> Result<(), BackendError> {
        tracing::debug!("closing all warp windows for {session_id}");
        self.applescript(ctx, "close warp windows", CLOSE_ALL_SCRIPT)
            .await
            .map(drop)
    }
}
