//! Git worktree service: one isolated checkout per window, under
//! `<base>/worktrees/<branch>_<hex-nanos>`.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("not a git repository: {dir} ({output})")]
    NotARepo { dir: PathBuf, output: String },

    #[error(
        "branch {branch:?} is already checked out in another worktree. Run `claude-grid clean` to remove stale worktrees"
    )]
    AlreadyCheckedOut { branch: String },

    #[error("branch already exists: {branch:?} ({output})")]
    BranchExists { branch: String, output: String },

    #[error("git {args} failed: {output}")]
    Git { args: String, output: String },

    #[error("{context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run `git <args>` and return trimmed combined output.
fn git(args: &[&str]) -> Result<String, WorktreeError> {
    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(|source| WorktreeError::Io {
            context: "run git in",
            path: PathBuf::from(args.get(1).copied().unwrap_or(".")),
            source,
        })?;
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
    .trim()
    .to_string();
    if output.status.success() {
        Ok(combined)
    } else {
        Err(WorktreeError::Git {
            args: args.join(" "),
            output: combined,
        })
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// `git -C <dir> checkout <branch>`.
pub fn checkout(dir: &Path, branch: &str) -> Result<(), WorktreeError> {
    git(&["-C", &path_str(dir), "checkout", branch]).map(drop)
}

/// True when `git status --porcelain` reports anything. Unreadable
/// worktrees count as clean.
pub fn is_dirty(path: &Path) -> bool {
    git(&["-C", &path_str(path), "status", "--porcelain"]).is_ok_and(|out| !out.is_empty())
}

#[derive(Debug, Clone)]
pub struct WorktreeManager {
    repo_path: PathBuf,
    worktree_base: PathBuf,
}

impl WorktreeManager {
    /// Resolve the repository containing `dir`.
    pub fn new(dir: &Path, worktree_base: PathBuf) -> Result<Self, WorktreeError> {
        let dir = std::path::absolute(dir).map_err(|source| WorktreeError::Io {
            context: "resolve",
            path: dir.to_path_buf(),
            source,
        })?;
        let root = git(&["-C", &path_str(&dir), "rev-parse", "--show-toplevel"]).map_err(|e| {
            WorktreeError::NotARepo {
                dir: dir.clone(),
                output: match e {
                    WorktreeError::Git { output, .. } => output,
                    other => other.to_string(),
                },
            }
        })?;
        if root.is_empty() {
            return Err(WorktreeError::NotARepo {
                dir,
                output: "empty repository root".into(),
            });
        }
        Ok(Self {
            repo_path: PathBuf::from(root),
            worktree_base,
        })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn git(&self, args: &[&str]) -> Result<String, WorktreeError> {
        let repo = path_str(&self.repo_path);
        let mut full = vec!["-C", repo.as_str()];
        full.extend_from_slice(args);
        git(&full)
    }

    /// Create a worktree on a new branch from `HEAD` and return its path.
    pub fn create(&self, branch: &str) -> Result<PathBuf, WorktreeError> {
        std::fs::create_dir_all(&self.worktree_base).map_err(|source| WorktreeError::Io {
            context: "create worktree base",
            path: self.worktree_base.clone(),
            source,
        })?;

        let listing = self.git(&["worktree", "list", "--porcelain"])?;
        let checked_out = format!("branch refs/heads/{branch}");
        if listing.lines().any(|line| line.trim() == checked_out) {
            return Err(WorktreeError::AlreadyCheckedOut {
                branch: branch.to_string(),
            });
        }

        let head = self.git(&["rev-parse", "HEAD"])?;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = self.worktree_base.join(format!("{branch}_{nanos:x}"));

        match self.git(&["worktree", "add", "-b", branch, &path_str(&path), &head]) {
            Ok(_) => {
                tracing::debug!("created worktree {} on {branch}", path.display());
                Ok(path)
            }
            Err(WorktreeError::Git { output, .. })
                if output.to_lowercase().contains("already checked out") =>
            {
                Err(WorktreeError::AlreadyCheckedOut {
                    branch: branch.to_string(),
                })
            }
            Err(WorktreeError::Git { output, .. })
                if output.to_lowercase().contains("already exists") =>
            {
                Err(WorktreeError::BranchExists {
                    branch: branch.to_string(),
                    output,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Remove a worktree. A path that is already gone only triggers a prune.
    pub fn remove(&self, path: &Path) -> Result<(), WorktreeError> {
        match std::fs::metadata(path) {
            Ok(_) => {
                self.git(&["worktree", "remove", "--force", &path_str(path)])?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(WorktreeError::Io {
                    context: "stat worktree",
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
        self.prune()
    }

    pub fn prune(&self) -> Result<(), WorktreeError> {
        self.git(&["worktree", "prune"]).map(drop)
    }

    pub fn has_submodules(&self) -> bool {
        self.git(&["submodule", "status"])
            .is_ok_and(|out| !out.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn init_repo(dir: &Path) {
        let d = path_str(dir);
        git(&["-C", &d, "init", "-q"]).expect("init");
        git(&[
            "-C",
            &d,
            "-c",
            "user.name=grid",
            "-c",
            "user.email=grid@example.com",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "-q",
            "--allow-empty",
            "-m",
            "init",
        ])
        .expect("commit");
    }

    #[test]
    fn not_a_repo() {
        if !git_available() {
            return;
        }
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = WorktreeManager::new(tmp.path(), tmp.path().join("wt")).unwrap_err();
        assert!(matches!(err, WorktreeError::NotARepo { .. }), "{err}");
    }

    #[test]
    fn create_remove_lifecycle() {
        if !git_available() {
            return;
        }
        let repo = tempfile::tempdir().expect("repo");
        let base = tempfile::tempdir().expect("base");
        init_repo(repo.path());

        let manager = WorktreeManager::new(repo.path(), base.path().join("worktrees")).expect("manager");
        assert!(!manager.has_submodules());

        let path = manager.create("brave-fox-1").expect("create");
        assert!(path.is_dir());
        let name = path.file_name().expect("name").to_string_lossy().into_owned();
        assert!(name.starts_with("brave-fox-1_"), "{name}");
        assert!(!is_dirty(&path));

        std::fs::write(path.join("new.txt"), "x").expect("write");
        assert!(is_dirty(&path));

        let err = manager.create("brave-fox-1").unwrap_err();
        assert!(matches!(err, WorktreeError::AlreadyCheckedOut { .. }), "{err}");

        manager.remove(&path).expect("remove");
        assert!(!path.exists());
        manager.remove(&path).expect("remove is idempotent");

        let err = manager.create("brave-fox-1").unwrap_err();
        assert!(matches!(err, WorktreeError::BranchExists { .. }), "{err}");
    }
}
