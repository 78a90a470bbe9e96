//! Logger and tracing configuration

use std::path::PathBuf;

use scopelog_storage::{normalize_database_path, DATABASE_FILE};

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "SCOPELOG_DB_PATH";

/// Default tracing filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str =
    "info,scopelog=debug,scopelog_core=debug,scopelog_storage=debug";

/// Where the logger keeps its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Database file. `.db` is appended when missing.
    pub db_path: PathBuf,

    /// Keep everything in a private in-memory database instead.
    pub in_memory: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DATABASE_FILE),
            in_memory: false,
        }
    }
}

impl LoggerConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            in_memory: false,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            in_memory: true,
            ..Self::default()
        }
    }

    /// Load from the environment, reading `.env` first if present.
    ///
    /// Falls back to [`LoggerConfig::default`] when `SCOPELOG_DB_PATH` is unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        match std::env::var(DB_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::new(path.trim()),
            _ => Self::default(),
        }
    }

    /// The file the store will open.
    pub fn database_path(&self) -> PathBuf {
        normalize_database_path(&self.db_path)
    }
}

/// Settings for the process-wide tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Directory for daily rolling log files. Console only when `None`.
    pub log_dir: Option<PathBuf>,
    pub file_prefix: String,
    /// Used when `RUST_LOG` is not set.
    pub default_filter: String,
    pub ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            file_prefix: "scopelog".to_string(),
            default_filter: DEFAULT_FILTER.to_string(),
            ansi: true,
        }
    }
}

impl TracingConfig {
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}
