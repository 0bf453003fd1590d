//! Application configuration.
//!
//! # Invariants
//! - Every on-disk path derives from one absolute `data_dir`.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DB_FILE_NAME: &str = "notestrip.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Where the app keeps its files and how verbosely it logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    #[serde(default = "default_level_string")]
    pub log_level: String,
}

impl AppConfig {
    /// Creates a config rooted at `data_dir` with the build-mode log level.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_level: default_level_string(),
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Item store file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Rolling log directory.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn default_level_string() -> String {
    default_log_level().to_string()
}
