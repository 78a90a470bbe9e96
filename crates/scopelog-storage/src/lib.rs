//! ScopeLog Storage Layer
//!
//! SQLite backend for the `LogStore` contract.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  LoggerScope                         │
//! ├──────────────────────────────────────────────────────┤
//! │        MapperRegistry / ModelMapper                  │
//! │     (one adapter per record shape, lazily built)     │
//! ├──────────────────────────────────────────────────────┤
//! │               LogStore trait                         │
//! ├──────────────────────────────────────────────────────┤
//! │              SqliteLogStore                          │
//! │   (DDL + row codec derived from ModelSchema)         │
//! ├──────────────────────────────────────────────────────┤
//! │                   Database                           │
//! │                   (SQLite)                           │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use scopelog_core::{LogEntry, LogModel, LogStore};
//! use scopelog_storage::{normalize_database_path, SqliteLogStore};
//!
//! let store = SqliteLogStore::open(&normalize_database_path("logs/app"))?;
//! store.create_table(&LogEntry::schema())?;
//! ```

mod database;
pub mod schema;
mod store;

pub use database::Database;
pub use store::SqliteLogStore;

use std::path::{Path, PathBuf};

/// Default database file name.
pub const DATABASE_FILE: &str = "scopelog_program_log.db";

/// Get the default database path for the current platform.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("scopelog").join(DATABASE_FILE))
}

/// Append a `.db` extension unless the path already ends with one (case-insensitive).
pub fn normalize_database_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let has_db_suffix = path
        .to_str()
        .map(|s| s.to_ascii_lowercase().ends_with(".db"))
        .unwrap_or(false);

    if has_db_suffix {
        path.to_path_buf()
    } else {
        let mut raw = path.as_os_str().to_os_string();
        raw.push(".db");
        PathBuf::from(raw)
    }
}
