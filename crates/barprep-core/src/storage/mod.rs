mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DemoConfig, EngagementConfig, TrialConfig};
pub use database::{Database, StudySessionRecord};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory.
///
/// `BARPREP_DATA_DIR` wins when set. Otherwise `~/.config/barprep[-dev]/`,
/// picked by `BARPREP_ENV` (`dev` selects the development directory).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("BARPREP_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BARPREP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("barprep-dev")
            } else {
                base_dir.join("barprep")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
