//! Domain types: the record contract, the default record and fault snapshots
//!
//! - `LogModel` / `Column` / `ModelSchema` - shape description of a record
//! - `LogEntry` - the built-in default record
//! - `ExceptionSnapshot` - serializable fault tree
//! - `Panicked`, `TimeoutError` - faults produced by guarded execution

mod fault;
mod level;
mod log_entry;
mod model;

pub use fault::{ExceptionSnapshot, Panicked, TimeoutError};
pub use level::LogLevel;
pub use log_entry::LogEntry;
pub use model::{
    short_name, short_type_name, Column, FieldKind, LogModel, ModelSchema, BASE_FIELDS,
    SCOPE_FIELD, TIME_FIELD,
};
