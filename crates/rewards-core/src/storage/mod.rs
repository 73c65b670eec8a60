mod config;
mod store;

pub use config::{AdminConfig, AudioConfig, Config, StorageConfig, StrikesConfig};
pub use store::{LoadOutcome, Store};

use std::path::PathBuf;

use crate::error::StorageError;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "KIDS_REWARDS_HOME";

/// Returns `$KIDS_REWARDS_HOME` if set, else `~/.config/kids-rewards/`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os(HOME_ENV) {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("kids-rewards"),
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
