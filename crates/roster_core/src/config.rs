//! Runtime configuration for the registry.
//!
//! # Responsibility
//! - Resolve the application data directory and the paths derived from it.
//! - Apply environment overrides (`ROSTER_DATA_DIR`, `ROSTER_LOG_LEVEL`).
//!
//! # Invariants
//! - `data_dir` is absolute; relative input is resolved against the current
//!   directory so derived paths (notably `log_dir`) are accepted by logging.
//! - All derived paths live under `data_dir`.

use crate::logging::default_log_level;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DATA_DIR_ENV: &str = "ROSTER_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "ROSTER_LOG_LEVEL";

const DB_FILE_NAME: &str = "roster.sqlite3";
const EXPORT_DIR_NAME: &str = "exports";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a data directory; set ROSTER_DATA_DIR")]
    NoDataDir,
    #[error("failed to create `{path}`: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolved configuration for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl CoreConfig {
    /// Builds a config rooted at an explicit directory.
    ///
    /// Relative directories are made absolute against the current directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            data_dir: std::path::absolute(&data_dir).unwrap_or(data_dir),
            log_level: default_log_level().to_string(),
        }
    }

    /// Resolves configuration from the environment, falling back to the
    /// platform data directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from("", "", "roster")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or(ConfigError::NoDataDir)?,
        };

        let mut config = Self::with_data_dir(data_dir);
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            if !level.trim().is_empty() {
                config.log_level = level;
            }
        }
        Ok(config)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join(EXPORT_DIR_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    /// Creates the data, export and log directories.
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        for dir in [self.data_dir.clone(), self.export_dir(), self.log_dir()] {
            create_dir(&dir)?;
        }
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::CreateDir {
        path: path.display().to_string(),
        source,
    })
}
