//! YAML manifest describing one window per instance.
//!
//! ```yaml
//! name: refactor
//! instances:
//!   - dir: ~/code/api
//!     prompt: "fix the flaky test"
//!   - dir: ../web
//!     branch: feature/login
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cli::MAX_COUNT;
use crate::pathutil::expand_tilde;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Instance {
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub branch: String,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("read manifest {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse manifest {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("manifest {path:?}: instances list is required and must not be empty")]
    Empty { path: PathBuf },
    #[error("manifest {path:?}: too many instances ({count}); maximum is {MAX_COUNT}")]
    TooMany { path: PathBuf, count: usize },
    #[error("manifest {path:?}: instance {index} is missing required field \"dir\"")]
    MissingDir { path: PathBuf, index: usize },
    #[error("manifest {path:?}: instance {index} dir {dir:?}: {detail}")]
    BadDir {
        path: PathBuf,
        index: usize,
        dir: String,
        detail: String,
    },
}

impl Manifest {
    /// Read and validate a manifest. Instance dirs come back tilde-expanded
    /// and, when relative, resolved against the manifest's directory.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let mut manifest: Manifest =
            serde_yaml::from_str(content).map_err(|source| ManifestError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;

        match manifest.instances.len() {
            0 => {
                return Err(ManifestError::Empty {
                    path: path.to_path_buf(),
                });
            }
            n if n > MAX_COUNT => {
                return Err(ManifestError::TooMany {
                    path: path.to_path_buf(),
                    count: n,
                });
            }
            _ => {}
        }

        let base = path.parent().unwrap_or(Path::new("."));
        for (index, inst) in manifest.instances.iter_mut().enumerate() {
            if inst.dir.is_empty() {
                return Err(ManifestError::MissingDir {
                    path: path.to_path_buf(),
                    index,
                });
            }
            let expanded = expand_tilde(&inst.dir).map_err(|e| ManifestError::BadDir {
                path: path.to_path_buf(),
                index,
                dir: inst.dir.clone(),
                detail: e.to_string(),
            })?;
            let expanded = PathBuf::from(expanded);
            let resolved = if expanded.is_absolute() {
                expanded
            } else {
                base.join(expanded)
            };
            inst.dir = resolved.to_string_lossy().into_owned();
        }

        Ok(manifest)
    }
}
