//! Storage configuration
//!
//! Both stores live in one data directory:
//! ```text
//! data/
//!   users.json     [{"username": ..., "password_hash": ...}, ...]
//!   history.json   [{"username": ..., "expression": ..., "result": ..., "timestamp": ...}, ...]
//! ```
//! The directory can be moved with the `CALCULATOR_DATA_DIR` environment variable.

use std::path::{Path, PathBuf};

// Constants
pub const DATA_DIR: &str = "data";
pub const USERS_FILE_NAME: &str = "users.json";
pub const HISTORY_FILE_NAME: &str = "history.json";
pub const DATA_DIR_ENV: &str = "CALCULATOR_DATA_DIR";

/// Locations of the persisted user and history files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub users_file: PathBuf,
    pub history_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::in_dir(DATA_DIR)
    }
}

impl StorageConfig {
    /// Place both files inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            users_file: dir.join(USERS_FILE_NAME),
            history_file: dir.join(HISTORY_FILE_NAME),
        }
    }

    /// Load from the environment
    ///
    /// Uses `CALCULATOR_DATA_DIR` when set and non-empty, otherwise `data/`.
    pub fn from_env() -> Self {
        Self::from_dir_override(std::env::var(DATA_DIR_ENV).ok())
    }

    fn from_dir_override(dir: Option<String>) -> Self {
        match dir {
            Some(dir) if !dir.trim().is_empty() => Self::in_dir(dir.trim()),
            _ => Self::default(),
        }
    }
}
