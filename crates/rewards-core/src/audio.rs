//! Per-rule audio cues.
//!
//! Recording a strike plays `rule<N>.mp3|wav|ogg` (N is the 1-based rule
//! number) on a detached background thread. Playback has no channel back
//! into the state; its only possible effect is an audit line on failure.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::audit::AuditLog;

/// Extensions tried in order; the first existing file wins.
pub const CUE_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

/// Something that can play an audio file.
///
/// Implementations run on a background thread and may block until playback
/// finishes.
pub trait CuePlayer: Send + Sync {
    fn play(&self, path: &Path) -> std::io::Result<()>;
}

/// Hands the file to the operating system's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPlayer;

impl CuePlayer for SystemPlayer {
    fn play(&self, path: &Path) -> std::io::Result<()> {
        open::that(path)
    }
}

/// Runs `program <file>` and waits for it to exit. A non-zero exit status
/// counts as a playback failure.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl CuePlayer for CommandPlayer {
    fn play(&self, path: &Path) -> std::io::Result<()> {
        let status = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("{} exited with {status}", self.program),
            ))
        }
    }
}

/// Candidate file names for `rule_index`, in preference order.
pub fn cue_candidates(rule_index: usize) -> Vec<String> {
    CUE_EXTENSIONS
        .iter()
        .map(|ext| format!("rule{}.{ext}", rule_index + 1))
        .collect()
}

/// First existing cue file for `rule_index` in `dir`.
pub fn resolve_cue(dir: &Path, rule_index: usize) -> Option<PathBuf> {
    cue_candidates(rule_index)
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Dispatches cues to a [`CuePlayer`] without blocking the caller.
#[derive(Clone)]
pub struct CueDispatcher {
    dir: PathBuf,
    player: Arc<dyn CuePlayer>,
    log: AuditLog,
}

impl CueDispatcher {
    pub fn new(dir: impl Into<PathBuf>, player: Arc<dyn CuePlayer>, log: AuditLog) -> Self {
        Self {
            dir: dir.into(),
            player,
            log,
        }
    }

    /// Start playing the cue for `rule_index`.
    ///
    /// Returns the playback thread's handle, or `None` if no cue file exists
    /// or the thread could not be started. Dropping the handle detaches the
    /// thread, which then dies with the process.
    pub fn dispatch(&self, rule_index: usize) -> Option<JoinHandle<()>> {
        let Some(path) = resolve_cue(&self.dir, rule_index) else {
            tracing::warn!(rule = rule_index + 1, dir = %self.dir.display(), "audio cue missing");
            self.log.log(format!(
                "Audio file missing for rule {} (tried {})",
                rule_index + 1,
                cue_candidates(rule_index).join(", ")
            ));
            return None;
        };

        let player = Arc::clone(&self.player);
        let log = self.log.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("cue-rule{}", rule_index + 1))
            .spawn(move || {
                if let Err(e) = player.play(&path) {
                    let file = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    tracing::warn!(file = %file, error = %e, "audio playback failed");
                    log.log(format!("Playback failed for {file}"));
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "could not start audio thread");
                None
            }
        }
    }
}

impl std::fmt::Debug for CueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueDispatcher")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}
