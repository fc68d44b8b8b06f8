//! Path helpers: tilde expansion, absolutizing, PATH lookup.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

/// Expand a leading `~` or `~/`. `~user` is rejected; anything else passes
/// through unchanged.
pub fn expand_tilde(path: &str) -> anyhow::Result<String> {
    expand_tilde_with(path, dirs::home_dir())
}

fn expand_tilde_with(path: &str, home: Option<PathBuf>) -> anyhow::Result<String> {
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(path.to_string());
    };
    if !rest.is_empty() && !rest.starts_with('/') {
        bail!("unsupported ~user syntax in path: {path}");
    }
    let home = home.context("failed to get home directory")?;
    Ok(format!("{}{rest}", home.display()))
}

/// Tilde-expand then make absolute against `base`.
pub fn resolve_dir(path: &str, base: &Path) -> anyhow::Result<PathBuf> {
    let expanded = PathBuf::from(expand_tilde(path)?);
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base.join(expanded))
    }
}

/// First executable named `name` on `PATH`.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> Option<PathBuf> {
        Some(PathBuf::from("/Users/bob"))
    }

    #[test]
    fn expands_home_forms() {
        assert_eq!(expand_tilde_with("~", home()).expect("ok"), "/Users/bob");
        assert_eq!(
            expand_tilde_with("~/code/app", home()).expect("ok"),
            "/Users/bob/code/app"
        );
    }

    #[test]
    fn passes_other_paths_through() {
        assert_eq!(expand_tilde_with("", home()).expect("ok"), "");
        assert_eq!(expand_tilde_with("/abs/~x", home()).expect("ok"), "/abs/~x");
        assert_eq!(expand_tilde_with("rel/dir", None).expect("ok"), "rel/dir");
    }

    #[test]
    fn rejects_user_syntax_and_missing_home() {
        let err = expand_tilde_with("~alice/x", home()).unwrap_err();
        assert!(err.to_string().contains("unsupported ~user syntax"));
        assert!(expand_tilde_with("~/x", None).is_err());
    }

    #[test]
    fn resolve_dir_joins_relative() {
        let base = Path::new("/work");
        assert_eq!(resolve_dir("sub", base).expect("ok"), PathBuf::from("/work/sub"));
        assert_eq!(resolve_dir("/abs", base).expect("ok"), PathBuf::from("/abs"));
    }

    #[cfg(unix)]
    #[test]
    fn finds_sh_on_path() {
        assert!(find_executable("sh").is_some());
        assert!(find_executable("definitely-not-a-real-binary-xyz").is_none());
    }
}
