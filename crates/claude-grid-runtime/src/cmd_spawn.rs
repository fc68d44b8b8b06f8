//! Root command: `claude-grid <count>` spawns a grid of Claude Code windows.
//!
//! Validation and directory resolution happen before anything touches the
//! OS. Once worktrees or windows exist, every failure path removes the
//! worktrees and makes a best-effort attempt to close the windows, and the
//! session record is only written after the spawn fully succeeded.

use std::path::Path;

use anyhow::{Context, anyhow, bail};
use chrono::Utc;
use claude_grid_core::{
    GridLayout, ScreenRect, SessionRecord, SessionStore, WindowRef, WorktreeRef,
    calculate_grid, calculate_window_bounds, min_cell_size, parse_layout,
};
use claude_grid_osa::{OsaExecutor, ScreenLocator, ScriptContext, ScriptRunner};
use claude_grid_terminal::{Backend, DEFAULT_COMMAND, SpawnOptions, TerminalBackend, WindowInfo};

use crate::branch::{generate_branch_prefix, validate_branch_prefix};
use crate::cli::{MAX_COUNT, SpawnOpts};
use crate::context::all_same;
use crate::manifest::Manifest;
use crate::pathutil::{find_executable, resolve_dir};
use crate::worktree::{self, WorktreeManager};

const MIN_READABLE_WIDTH: i32 = 400;
const MIN_READABLE_HEIGHT: i32 = 200;

/// Resolved inputs for one spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Plan {
    pub count: usize,
    pub dirs: Vec<String>,
    pub prompts: Vec<String>,
    /// Branch per window, from the manifest. Empty means leave as is.
    pub branches: Vec<String>,
    pub manifest_path: Option<String>,
}

impl Plan {
    pub fn primary_dir(&self) -> &str {
        self.dirs.first().map(String::as_str).unwrap_or_default()
    }
}

pub(crate) fn parse_count(raw: &str) -> anyhow::Result<usize> {
    let n: i64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid count {raw:?}: must be a number between 1 and {MAX_COUNT}"))?;
    check_count(n)
}

fn check_count(n: i64) -> anyhow::Result<usize> {
    match usize::try_from(n) {
        Ok(c) if (1..=MAX_COUNT).contains(&c) => Ok(c),
        _ => bail!("invalid count {n}: must be between 1 and {MAX_COUNT}"),
    }
}

/// Turn flags (or a manifest) into a count, per-window dirs and prompts.
pub(crate) fn plan(opts: &SpawnOpts, cwd: &Path) -> anyhow::Result<Plan> {
    let plan = match opts.manifest.as_deref() {
        Some(manifest) => plan_from_manifest(opts, manifest, cwd)?,
        None => plan_from_flags(opts, cwd)?,
    };

    for dir in &plan.dirs {
        if !Path::new(dir).exists() {
            bail!("directory does not exist: {dir}");
        }
    }
    Ok(plan)
}

fn plan_from_manifest(opts: &SpawnOpts, manifest: &str, cwd: &Path) -> anyhow::Result<Plan> {
    if !opts.dirs.is_empty() || !opts.prompts.is_empty() || opts.worktrees || opts.count.is_some() {
        bail!("--manifest cannot be combined with --dir, --prompt, --worktrees, or count argument");
    }
    let path = resolve_dir(manifest, cwd).with_context(|| format!("invalid manifest path {manifest:?}"))?;
    let parsed = Manifest::load(&path).with_context(|| format!("failed to parse manifest {manifest:?}"))?;
    tracing::debug!("loaded manifest {:?} with {} instances", parsed.name, parsed.instances.len());

    Ok(Plan {
        count: parsed.instances.len(),
        dirs: parsed.instances.iter().map(|i| i.dir.clone()).collect(),
        prompts: parsed.instances.iter().map(|i| i.prompt.clone()).collect(),
        branches: parsed.instances.iter().map(|i| i.branch.clone()).collect(),
        manifest_path: Some(manifest.to_string()),
    })
}

fn plan_from_flags(opts: &SpawnOpts, cwd: &Path) -> anyhow::Result<Plan> {
    let count = match (&opts.count, opts.dirs.len()) {
        (Some(raw), _) => parse_count(raw)?,
        (None, n) if n > 0 => check_count(i64::try_from(n).unwrap_or(i64::MAX))?,
        (None, _) => bail!("count argument is required: claude-grid <count>"),
    };

    let dirs = if opts.dirs.is_empty() {
        vec![cwd.to_string_lossy().into_owned(); count]
    } else {
        if opts.dirs.len() > count {
            bail!("more --dir flags ({}) than instances ({count})", opts.dirs.len());
        }
        let mut dirs = Vec::with_capacity(count);
        for d in &opts.dirs {
            let abs = resolve_dir(d, cwd).with_context(|| format!("invalid directory {d:?}"))?;
            dirs.push(abs.to_string_lossy().into_owned());
        }
        let last = dirs.last().cloned().unwrap_or_default();
        dirs.resize(count, last);
        dirs
    };

    if opts.prompts.len() > count {
        bail!("more --prompt flags ({}) than instances ({count})", opts.prompts.len());
    }
    let mut prompts = opts.prompts.clone();
    prompts.resize(count, String::new());

    Ok(Plan {
        count,
        dirs,
        prompts,
        branches: Vec::new(),
        manifest_path: None,
    })
}

/// Worktrees created for this spawn, removed again if the spawn fails.
struct Worktrees {
    manager: WorktreeManager,
    refs: Vec<WorktreeRef>,
}

impl Worktrees {
    fn create(dir: &Path, count: usize, prefix: Option<&str>, base_dir: &Path) -> anyhow::Result<Self> {
        let manager = WorktreeManager::new(dir, base_dir.join("worktrees"))
            .context("failed to initialize git worktree manager")?;
        if manager.has_submodules() {
            eprintln!("warning: git submodules detected; worktree operations may require additional setup");
        }

        let prefix = match prefix.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => {
                validate_branch_prefix(p).with_context(|| format!("invalid branch prefix {p:?}"))?;
                p.to_string()
            }
            None => generate_branch_prefix(),
        };

        let mut set = Self {
            manager,
            refs: Vec::with_capacity(count),
        };
        for i in 0..count {
            let branch = format!("{prefix}-{}", i + 1);
            match set.manager.create(&branch) {
                Ok(path) => set.refs.push(WorktreeRef {
                    path: path.to_string_lossy().into_owned(),
                    branch,
                }),
                Err(e) => {
                    set.cleanup();
                    return Err(anyhow::Error::new(e)
                        .context(format!("failed to create worktree for branch {branch:?}")));
                }
            }
        }
        Ok(set)
    }

    fn dirs(&self) -> Vec<String> {
        self.refs.iter().map(|r| r.path.clone()).collect()
    }

    fn cleanup(&self) {
        for wt in &self.refs {
            if let Err(e) = self.manager.remove(Path::new(&wt.path)) {
                eprintln!("warning: failed to clean up worktree {:?}: {e}", wt.path);
            }
        }
    }
}

pub async fn cmd_spawn(
    ctx: &ScriptContext,
    base_dir: &Path,
    opts: &SpawnOpts,
    verbose: bool,
) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let plan = plan(opts, &cwd)?;

    for (dir, branch) in plan.dirs.iter().zip(&plan.branches) {
        if !branch.is_empty() {
            worktree::checkout(Path::new(dir), branch)
                .with_context(|| format!("failed to checkout branch {branch:?} in {dir}"))?;
        }
    }

    let claude = find_executable(DEFAULT_COMMAND).ok_or_else(|| {
        anyhow!("'claude' not found in PATH. Install: npm install -g @anthropic-ai/claude-code")
    })?;

    let executor = OsaExecutor::new();
    let store = SessionStore::new(base_dir);
    let backend = Backend::select(&opts.terminal, executor.clone(), store.clone())
        .context("failed to select terminal backend (try --terminal terminal or install Warp)")?;
    let name = session_name(opts.name.as_deref(), &store)?;

    if verbose {
        println!("Verbose: claude={} backend={}", claude.display(), backend.name());
    }

    let worktrees = if opts.worktrees {
        Some(Worktrees::create(
            Path::new(plan.primary_dir()),
            plan.count,
            opts.branch_prefix.as_deref(),
            base_dir,
        )?)
    } else {
        None
    };

    let launch = Launch {
        backend: &backend,
        locator: ScreenLocator::new(&executor),
        store: &store,
        name: &name,
        layout: opts.layout.as_deref(),
        plan: &plan,
        worktrees: worktrees.as_ref(),
    };
    let result = launch.run(ctx).await;
    if let (Err(_), Some(worktrees)) = (&result, &worktrees) {
        worktrees.cleanup();
    }
    result.map(drop)
}

/// `--name` if given, else a fresh generated one.
fn session_name(requested: Option<&str>, store: &SessionStore) -> anyhow::Result<String> {
    match requested.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => {
            SessionStore::validate_name(name)?;
            Ok(name.to_string())
        }
        None => Ok(store.generate_name()),
    }
}

/// Everything needed to place, spawn and record one grid once the plan and
/// any worktrees exist.
struct Launch<'a, B, R> {
    backend: &'a B,
    locator: ScreenLocator<R>,
    store: &'a SessionStore,
    name: &'a str,
    layout: Option<&'a str>,
    plan: &'a Plan,
    worktrees: Option<&'a Worktrees>,
}

impl<B: TerminalBackend, R: ScriptRunner> Launch<'_, B, R> {
    /// Spawn the windows and persist the record. Windows are closed again
    /// when the spawn fails or the record cannot be written, so a record
    /// only ever exists for a fully spawned grid.
    async fn run(&self, ctx: &ScriptContext) -> anyhow::Result<SessionRecord> {
        let plan = self.plan;
        let screen = match self.locator.detect(ctx).await {
            Ok(screen) => screen,
            Err(e) if e.is_context() => return Err(e.into()),
            Err(e) => {
                eprintln!("warning: failed to detect screen, using fallback 1920x1080: {e}");
                ScreenRect::FALLBACK
            }
        };

        let grid = resolve_grid(self.layout, plan.count)?;
        let bounds = calculate_window_bounds(grid, screen, plan.count);
        let (min_w, min_h) = min_cell_size(&bounds, plan.count);
        if min_w < MIN_READABLE_WIDTH || min_h < MIN_READABLE_HEIGHT {
            eprintln!("warning: small windows detected ({min_w}x{min_h} minimum). Readability may be reduced.");
        }

        println!(
            "Detected: {}, terminal {}, screen {}x{}",
            std::env::consts::OS,
            self.backend.name(),
            screen.width,
            screen.height
        );
        println!("Layout: {grid} grid ({min_w}x{min_h} per window)");
        if all_same(&plan.dirs) {
            println!("Directory: {}", plan.primary_dir());
        } else {
            println!("Directories: {} different directories", plan.dirs.len());
        }
        println!("Spawning {} Claude Code instances...", plan.count);

        let spawn = SpawnOptions {
            count: plan.count,
            command: DEFAULT_COMMAND.to_string(),
            dir: plan.primary_dir().to_string(),
            dirs: self.worktrees.map_or_else(|| plan.dirs.clone(), Worktrees::dirs),
            prompts: plan.prompts.clone(),
            grid,
            screen,
            bounds,
            session_id: self.name.to_string(),
        };

        let windows = match self.backend.spawn_windows(ctx, &spawn).await {
            Ok(windows) => windows,
            Err(e) => {
                close_best_effort(self.backend, self.name, &[]).await;
                return Err(anyhow::Error::new(e).context("failed to spawn windows"));
            }
        };

        let record = build_record(self.name, self.backend.name(), plan, &windows, self.worktrees);
        if let Err(e) = self.store.save(&record) {
            close_best_effort(self.backend, self.name, &windows).await;
            return Err(anyhow::Error::new(e).context("failed to save session"));
        }

        println!(
            "Session {:?} created. Use `claude-grid kill {}` to close all.",
            self.name, self.name
        );
        Ok(record)
    }
}

/// Explicit `RxC` layout, else the computed one. An explicit layout must
/// have room for every window.
pub(crate) fn resolve_grid(layout: Option<&str>, count: usize) -> anyhow::Result<GridLayout> {
    match layout.map(str::trim).filter(|l| !l.is_empty()) {
        Some(layout) => {
            let grid = parse_layout(layout).with_context(|| format!("invalid layout {layout:?}"))?;
            if grid.cells() < count {
                bail!("layout {grid} has {} cells, fewer than {count} windows", grid.cells());
            }
            Ok(grid)
        }
        None => Ok(calculate_grid(count)),
    }
}

/// Close the windows of an unrecorded spawn. Runs on a fresh context so
/// cleanup still happens after an interrupt.
async fn close_best_effort<B: TerminalBackend>(backend: &B, name: &str, windows: &[WindowInfo]) {
    if let Err(e) = backend.close_windows(&ScriptContext::new(), windows).await {
        tracing::warn!("cleanup of {name} failed: {e}");
    }
}

fn build_record(
    name: &str,
    backend: &str,
    plan: &Plan,
    windows: &[WindowInfo],
    worktrees: Option<&Worktrees>,
) -> SessionRecord {
    let mut record = SessionRecord {
        name: name.to_string(),
        backend: backend.to_string(),
        count: plan.count,
        dir: plan.primary_dir().to_string(),
        dirs: plan.dirs.clone(),
        prompts: plan.prompts.clone(),
        created_at: Utc::now(),
        windows: windows.iter().map(WindowRef::from).collect(),
        worktrees: Vec::new(),
        status: None,
        repo_path: None,
        manifest_path: plan.manifest_path.clone(),
    };
    if let Some(wt) = worktrees.filter(|wt| !wt.refs.is_empty()) {
        record.worktrees = wt.refs.clone();
        record.status = Some("active".to_string());
        record.repo_path = Some(wt.manager.repo_path().to_string_lossy().into_owned());
    }
    record
}

#[cfg(test)]
mod tests {
    use claude_grid_osa::{OsaError, ScriptLanguage};

    use super::*;
    use crate::cmd_kill::tests::FakeBackend;

    /// Screen detection always fails, so launches use the fallback screen.
    struct NoScreen;

    impl ScriptRunner for NoScreen {
        async fn run(
            &self,
            ctx: &ScriptContext,
            _language: ScriptLanguage,
            _script: &str,
        ) -> Result<String, OsaError> {
            ctx.check()?;
            Err(OsaError::ScriptFailed {
                status: "exit 1".into(),
                output: "no display".into(),
            })
        }
    }

    fn two_window_plan() -> Plan {
        Plan {
            count: 2,
            dirs: vec!["/repo".into(), "/repo".into()],
            prompts: vec![String::new(), "go".into()],
            branches: Vec::new(),
            manifest_path: None,
        }
    }

    async fn run_launch(
        backend: &FakeBackend,
        store: &SessionStore,
        ctx: &ScriptContext,
    ) -> anyhow::Result<SessionRecord> {
        let plan = two_window_plan();
        Launch {
            backend,
            locator: ScreenLocator::new(NoScreen),
            store,
            name: "grid-test",
            layout: None,
            plan: &plan,
            worktrees: None,
        }
        .run(ctx)
        .await
    }

    fn closed_windows(backend: &FakeBackend) -> Vec<Vec<String>> {
        backend.closed_windows.lock().expect("lock").clone()
    }

    #[tokio::test]
    async fn launch_records_a_successful_spawn() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(tmp.path());
        let backend = FakeBackend::default();

        let record = run_launch(&backend, &store, &ScriptContext::new())
            .await
            .expect("launch");

        assert_eq!(record.backend, "fake");
        assert_eq!(store.load("grid-test").expect("load"), record);
        assert_eq!(record.windows.len(), 2);
        assert!(closed_windows(&backend).is_empty());
    }

    #[tokio::test]
    async fn failed_spawn_leaves_no_record_and_cleans_up() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(tmp.path());
        let backend = FakeBackend {
            fail_spawn: true,
            ..FakeBackend::default()
        };

        let err = run_launch(&backend, &store, &ScriptContext::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to spawn windows");
        assert!(store.list().expect("list").is_empty());
        assert_eq!(closed_windows(&backend), vec![Vec::<String>::new()]);
    }

    #[tokio::test]
    async fn failed_save_closes_the_spawned_windows() {
        let tmp = tempfile::tempdir().expect("tempdir");
        // A file where the sessions directory should be makes every save fail.
        std::fs::write(tmp.path().join("sessions"), "").expect("write");
        let store = SessionStore::new(tmp.path());
        let backend = FakeBackend::default();

        let err = run_launch(&backend, &store, &ScriptContext::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to save session");
        assert_eq!(closed_windows(&backend), vec![vec!["1".to_string(), "2".to_string()]]);
        assert!(backend.closed.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn cancelled_launch_spawns_nothing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(tmp.path());
        let backend = FakeBackend::default();
        let ctx = ScriptContext::new();
        ctx.cancel();

        assert!(run_launch(&backend, &store, &ctx).await.is_err());
        assert!(store.list().expect("list").is_empty());
        assert!(closed_windows(&backend).is_empty());
    }

    #[test]
    fn session_names() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(tmp.path());
        assert_eq!(session_name(Some(" mine "), &store).expect("name"), "mine");
        assert!(session_name(None, &store).expect("name").starts_with("grid-"));
        assert!(session_name(Some("  "), &store).expect("name").starts_with("grid-"));
        assert!(session_name(Some("../x"), &store).is_err());
    }

    fn opts() -> SpawnOpts {
        SpawnOpts::default()
    }

    fn dir_str(p: &Path) -> String {
        p.to_string_lossy().into_owned()
    }

    #[test]
    fn count_parsing() {
        assert_eq!(parse_count(" 3 ").expect("ok"), 3);
        assert_eq!(parse_count("16").expect("ok"), 16);
        assert_eq!(
            parse_count("abc").unwrap_err().to_string(),
            "invalid count \"abc\": must be a number between 1 and 16"
        );
        assert_eq!(
            parse_count("17").unwrap_err().to_string(),
            "invalid count 17: must be between 1 and 16"
        );
        assert_eq!(
            parse_count("-2").unwrap_err().to_string(),
            "invalid count -2: must be between 1 and 16"
        );
        assert!(parse_count("0").is_err());
    }

    #[test]
    fn count_defaults_to_cwd() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let o = SpawnOpts {
            count: Some("3".into()),
            prompts: vec!["a".into()],
            ..opts()
        };
        let p = plan(&o, tmp.path()).expect("plan");
        assert_eq!(p.count, 3);
        assert_eq!(p.dirs, vec![dir_str(tmp.path()); 3]);
        assert_eq!(p.prompts, vec!["a", "", ""]);
        assert_eq!(p.manifest_path, None);
    }

    #[test]
    fn dirs_infer_count_and_fill_with_last() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(tmp.path().join("a")).expect("mkdir");
        std::fs::create_dir(tmp.path().join("b")).expect("mkdir");

        let o = SpawnOpts {
            dirs: vec!["a".into(), "b".into()],
            ..opts()
        };
        let p = plan(&o, tmp.path()).expect("plan");
        assert_eq!(p.count, 2);

        let o = SpawnOpts {
            count: Some("4".into()),
            dirs: vec!["a".into(), "b".into()],
            ..opts()
        };
        let p = plan(&o, tmp.path()).expect("plan");
        let b = dir_str(&tmp.path().join("b"));
        assert_eq!(p.dirs[0], dir_str(&tmp.path().join("a")));
        assert_eq!(&p.dirs[1..], &[b.clone(), b.clone(), b]);
        assert!(!all_same(&p.dirs));
    }

    #[test]
    fn too_many_dirs_or_prompts() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let o = SpawnOpts {
            count: Some("1".into()),
            dirs: vec![".".into(), ".".into()],
            ..opts()
        };
        assert_eq!(
            plan(&o, tmp.path()).unwrap_err().to_string(),
            "more --dir flags (2) than instances (1)"
        );

        let o = SpawnOpts {
            count: Some("1".into()),
            prompts: vec!["a".into(), "b".into()],
            ..opts()
        };
        assert_eq!(
            plan(&o, tmp.path()).unwrap_err().to_string(),
            "more --prompt flags (2) than instances (1)"
        );
    }

    #[test]
    fn missing_count_and_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        assert_eq!(
            plan(&opts(), tmp.path()).unwrap_err().to_string(),
            "count argument is required: claude-grid <count>"
        );

        let o = SpawnOpts {
            dirs: vec!["nope".into()],
            ..opts()
        };
        let err = plan(&o, tmp.path()).unwrap_err().to_string();
        assert!(err.starts_with("directory does not exist: "), "{err}");
    }

    #[test]
    fn seventeen_dirs_is_too_many() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let o = SpawnOpts {
            dirs: vec![".".into(); 17],
            ..opts()
        };
        assert_eq!(
            plan(&o, tmp.path()).unwrap_err().to_string(),
            "invalid count 17: must be between 1 and 16"
        );
    }

    #[test]
    fn manifest_conflicts() {
        let tmp = tempfile::tempdir().expect("tempdir");
        for o in [
            SpawnOpts {
                count: Some("2".into()),
                ..opts()
            },
            SpawnOpts {
                worktrees: true,
                ..opts()
            },
            SpawnOpts {
                dirs: vec![".".into()],
                ..opts()
            },
        ] {
            let o = SpawnOpts {
                manifest: Some("grid.yaml".into()),
                ..o
            };
            assert!(plan(&o, tmp.path())
                .unwrap_err()
                .to_string()
                .starts_with("--manifest cannot be combined"));
        }
    }

    #[test]
    fn manifest_plan() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(tmp.path().join("api")).expect("mkdir");
        std::fs::write(
            tmp.path().join("grid.yaml"),
            "instances:\n  - dir: api\n    prompt: fix it\n    branch: main\n  - dir: .\n",
        )
        .expect("write");

        let o = SpawnOpts {
            manifest: Some("grid.yaml".into()),
            ..opts()
        };
        let p = plan(&o, tmp.path()).expect("plan");
        assert_eq!(p.count, 2);
        assert_eq!(p.dirs[0], dir_str(&tmp.path().join("api")));
        assert_eq!(p.prompts, vec!["fix it", ""]);
        assert_eq!(p.branches, vec!["main", ""]);
        assert_eq!(p.manifest_path.as_deref(), Some("grid.yaml"));
    }

    #[test]
    fn grid_resolution() {
        assert_eq!(resolve_grid(None, 5).expect("grid"), GridLayout::new(2, 3));
        assert_eq!(resolve_grid(Some("  "), 4).expect("grid"), GridLayout::new(2, 2));
        assert_eq!(resolve_grid(Some("3X1"), 3).expect("grid"), GridLayout::new(3, 1));
        assert!(resolve_grid(Some("1x2"), 3).is_err());
        assert!(resolve_grid(Some("axb"), 1).is_err());
    }

    #[test]
    fn record_without_worktrees() {
        let p = Plan {
            count: 2,
            dirs: vec!["/r".into(), "/r".into()],
            prompts: vec![String::new(), "go".into()],
            branches: Vec::new(),
            manifest_path: Some("m.yaml".into()),
        };
        let windows = vec![
            WindowInfo {
                id: "1".into(),
                index: 0,
                backend: "warp",
            },
            WindowInfo {
                id: "2".into(),
                index: 1,
                backend: "warp",
            },
        ];
        let rec = build_record("grid-beef", "warp", &p, &windows, None);
        assert_eq!(rec.name, "grid-beef");
        assert_eq!(rec.backend, "warp");
        assert_eq!(rec.dir, "/r");
        assert_eq!(rec.windows[1].id, "2");
        assert_eq!(rec.status, None);
        assert_eq!(rec.repo_path, None);
        assert_eq!(rec.manifest_path.as_deref(), Some("m.yaml"));
    }
}
