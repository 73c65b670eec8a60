//! JSON state file persistence.
//!
//! The whole [`RewardsState`] is rewritten after every mutation. A file that
//! cannot be read or parsed is moved aside to a timestamped `.bak` file and
//! replaced by defaults; its bytes are never discarded.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::audit::AuditLog;
use crate::error::StorageError;
use crate::state::RewardsState;

/// Result of [`Store::load`].
#[derive(Debug)]
pub struct LoadOutcome {
    pub state: RewardsState,
    /// Where a corrupt file was moved, if one was found.
    pub recovered_backup: Option<PathBuf>,
}

/// The single state file plus its backups, which live next to it.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    log: AuditLog,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>, log: AuditLog) -> Self {
        Self {
            path: path.into(),
            log,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored state, recovering from anything unusable.
    ///
    /// Never fails: a missing file gives the default state, a corrupt one is
    /// backed up and also gives the default state.
    pub fn load(&self) -> LoadOutcome {
        match self.read() {
            Ok(Some(state)) => LoadOutcome {
                state,
                recovered_backup: None,
            },
            Ok(None) => LoadOutcome {
                state: RewardsState::default(),
                recovered_backup: None,
            },
            Err(reason) => LoadOutcome {
                state: RewardsState::default(),
                recovered_backup: self.recover(&reason),
            },
        }
    }

    /// Overwrite the state file with `state`.
    ///
    /// Returns `false` if the write failed; the failure is logged and the
    /// caller keeps its in-memory state.
    pub fn save(&self, state: &RewardsState) -> bool {
        match self.try_save(state) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to save state");
                self.log.log(format!("Error saving {}: {e}", self.file_name()));
                false
            }
        }
    }

    /// Move the current state file to `<stem>_<kind>_<timestamp>.bak`.
    ///
    /// Returns `Ok(None)` if there is no state file to back up.
    ///
    /// # Errors
    /// Returns [`StorageError::BackupFailed`] if the file could not be moved.
    pub fn backup(&self, kind: &str) -> Result<Option<PathBuf>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let target = unique_backup_path(&self.path, kind, &stamp);
        std::fs::rename(&self.path, &target).map_err(|source| StorageError::BackupFailed {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(from = %self.path.display(), to = %target.display(), "state file backed up");
        Ok(Some(target))
    }

    fn read(&self) -> Result<Option<RewardsState>, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Corrupt(e.to_string())),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(StorageError::Corrupt("empty file".into()));
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    fn recover(&self, reason: &StorageError) -> Option<PathBuf> {
        tracing::warn!(path = %self.path.display(), error = %reason, "unusable state file");
        match self.backup("corrupt") {
            Ok(Some(backup)) => {
                self.log.log(format!(
                    "Bad {} detected; backed up to {} ({reason})",
                    self.file_name(),
                    backup_name(&backup)
                ));
                Some(backup)
            }
            Ok(None) => None,
            Err(e) => {
                self.log.log(format!("Failed to backup bad {}: {e}", self.file_name()));
                None
            }
        }
    }

    fn try_save(&self, state: &RewardsState) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .and_then(|()| std::fs::rename(&tmp, &self.path))
            .map_err(|source| StorageError::WriteFailed {
                path: self.path.clone(),
                source,
            })
    }

    fn file_name(&self) -> String {
        backup_name(&self.path)
    }
}

fn backup_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<dir>/<stem>_<kind>_<stamp>.bak`, with `-1`, `-2`, … appended if that
/// name is already taken.
fn unique_backup_path(path: &Path, kind: &str, stamp: &str) -> PathBuf {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".into());
    let base = format!("{stem}_{kind}_{stamp}");

    let mut candidate = dir.join(format!("{base}.bak"));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{base}-{n}.bak"));
        n += 1;
    }
    candidate
}
