//! Append-only audit log.
//!
//! One line per event: `[YYYY-mm-dd HH:MM:SS] message`. The file is only
//! ever opened in append mode; nothing here truncates or rewrites it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

/// Handle to the audit log file. Cheap to clone; clones append to the same
/// file.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one timestamped line.
    ///
    /// A failed write is reported through `tracing` and otherwise ignored.
    pub fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        let line = format_line(&Local::now().format("%Y-%m-%d %H:%M:%S").to_string(), message);
        tracing::info!(target: "audit", "{message}");
        if let Err(e) = self.append(&line) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write audit log");
        }
    }

    /// Full log content, verbatim. Empty if nothing has been logged yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn read_all(&self) -> std::io::Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

fn format_line(stamp: &str, message: &str) -> String {
    // Keep one event per line even if a message carries a newline.
    let flat = message.replace(['\r', '\n'], " ");
    format!("[{stamp}] {flat}\n")
}
