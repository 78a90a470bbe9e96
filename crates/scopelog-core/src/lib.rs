//! # ScopeLog Core Library
//!
//! Record model, storage contract and export pipeline for ScopeLog.
//!
//! ## Modules
//!
//! - `domain` - The `LogModel` contract, the default `LogEntry` record, levels and fault snapshots
//! - `repository` - The `LogStore` trait implemented by storage backends
//! - `mapper` - Type-indexed registry of per-shape insert adapters
//! - `formatting` - Field extraction, CSV/JSON/tab formatters and file export
//! - `query` - In-process filters over fetched records

pub mod domain;
pub mod formatting;
pub mod mapper;
pub mod query;
pub mod repository;

// Re-export commonly used types
pub use domain::*;
pub use formatting::{
    export, extract, Field, LogFormatter, CsvFormatter, JsonFormatter, TabDelimitedFormatter,
};
pub use mapper::{DefaultMapper, LogEntryMapper, MapperRegistry, ModelMapper};
pub use query::{ExportExt, LogEntryQueryExt, LogQueryExt};
pub use repository::{from_row, to_row, LogStore, Row, StoreResult};
