//! Session records: what a spawn created, persisted as one JSON file per
//! session so a later `kill` or `clean` can undo it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Reference to a spawned window. `id` is backend-native (a Terminal.app
/// window id, or a 1-based ordinal for Warp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRef {
    pub id: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeRef {
    pub path: String,
    pub branch: String,
}

/// On-disk session record. Records written before `dirs`, `prompts`,
/// `worktrees`, `status`, `repo_path` or `manifest_path` existed still load;
/// the missing fields come back empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub name: String,
    pub backend: String,
    pub count: usize,
    pub dir: String,
    #[serde(default)]
    pub dirs: Vec<String>,
    #[serde(default)]
    pub prompts: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub windows: Vec<WindowRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub worktrees: Vec<WorktreeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<String>,
}

impl SessionRecord {
    /// Status shown to the user; records without one are `active`.
    pub fn display_status(&self) -> &str {
        self.status.as_deref().unwrap_or("active")
    }
}

/// `$CLAUDE_GRID_HOME`, else `~/.claude-grid`.
pub fn default_base_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("CLAUDE_GRID_HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".claude-grid"),
        None => PathBuf::from("~/.claude-grid"),
    }
}

/// JSON-file store rooted at `<base>/sessions`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions_dir: PathBuf,
}

impl SessionStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            sessions_dir: base_dir.as_ref().join("sessions"),
        }
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.sessions_dir.join(format!("{name}.json"))
    }

    /// Names become file names under the sessions directory, so anything
    /// that could escape it is rejected.
    pub fn validate_name(name: &str) -> Result<(), SessionError> {
        if name.trim().is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(SessionError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// `grid-XXXX` with four random hex digits, retried until no file of
    /// that name exists.
    pub fn generate_name(&self) -> String {
        loop {
            let suffix: u16 = rand::random();
            let name = format!("grid-{suffix:04x}");
            if !self.path_for(&name).exists() {
                return name;
            }
        }
    }

    /// Write the record, creating the sessions directory if needed.
    pub fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        Self::validate_name(&record.name)?;
        std::fs::create_dir_all(&self.sessions_dir).map_err(|source| SessionError::Io {
            path: self.sessions_dir.clone(),
            source,
        })?;

        let path = self.path_for(&record.name);
        let json = serde_json::to_string_pretty(record).map_err(|source| SessionError::Json {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, format!("{json}\n"))
            .map_err(|source| SessionError::Io { path, source })?;

        tracing::debug!("saved session {}", record.name);
        Ok(())
    }

    /// Overwrite an existing record (status or worktree changes).
    pub fn update(&self, record: &SessionRecord) -> Result<(), SessionError> {
        self.save(record)
    }

    pub fn load(&self, name: &str) -> Result<SessionRecord, SessionError> {
        Self::validate_name(name)?;
        let path = self.path_for(name);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SessionError::NotFound(name.to_string()));
            }
            Err(source) => return Err(SessionError::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|source| SessionError::Json { path, source })
    }

    /// All readable records; unreadable or malformed files are skipped.
    /// A missing sessions directory is an empty list.
    pub fn list(&self) -> Result<Vec<SessionRecord>, SessionError> {
        let entries = match std::fs::read_dir(&self.sessions_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.sessions_dir.clone(),
                    source,
                });
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|e| {
                let path = e.path();
                if path.extension().and_then(|x| x.to_str()) != Some("json") {
                    return None;
                }
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .collect();
        names.sort();

        let mut records = Vec::with_capacity(names.len());
        for name in names {
            match self.load(&name) {
                Ok(record) => records.push(record),
                Err(e) => tracing::debug!("skipping session {name}: {e}"),
            }
        }
        Ok(records)
    }

    pub fn delete(&self, name: &str) -> Result<(), SessionError> {
        Self::validate_name(name)?;
        let path = self.path_for(name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SessionError::NotFound(name.to_string()))
            }
            Err(source) => Err(SessionError::Io { path, source }),
        }
    }
}
