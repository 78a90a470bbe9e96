//! # ScopeLog
//!
//! Scoped, structured application logging into a local SQLite database.
//!
//! A [`LoggerScope`] tags every record it writes with its name (usually the
//! short name of a type) and the current time. Records are either the
//! built-in [`LogEntry`] or any caller-defined [`LogModel`]; each shape gets
//! its own table, created on first use. Guarded helpers run an action, log
//! whatever goes wrong, and either swallow or propagate the fault.
//!
//! ## Modules
//!
//! - `context` - Store + mapper registry owner, scope factory, process-wide instance
//! - `scope` - Writing, dumping and reading records of one scope
//! - `guard` - `guarded_call` and `with_timeout`, sync and async
//! - `hooks` - Typed post-write hook helpers
//! - `layer` - `tracing` bridge persisting events into a scope
//! - `telemetry` - Global tracing subscriber setup
//! - `config` - Logger and tracing settings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scopelog::{LogLevel, LoggerConfig, LoggerContext};
//!
//! struct Checkout;
//!
//! let context = LoggerContext::open(&LoggerConfig::from_env())?;
//! let log = context.begin_scope::<Checkout>();
//! log.log_level(LogLevel::Information, "cart opened")?;
//! log.guarded_call(|| charge_card(), Some("charge"), true)?;
//! ```

pub mod config;
pub mod context;
pub mod error;
mod guard;
pub mod hooks;
pub mod layer;
pub mod scope;
pub mod telemetry;

pub use config::{LoggerConfig, TracingConfig};
pub use context::{
    begin_default_scope, begin_scope, global, initialize, is_initialized, teardown, DefaultScope,
    LoggerContext,
};
pub use error::{ScopeError, ScopeResult};
pub use guard::DEFAULT_OPERATION;
pub use hooks::TypedHandler;
pub use layer::ScopeLayer;
pub use scope::{LoggerScope, OnLogged};

pub use scopelog_core::formatting::{csv, json, tabs};
pub use scopelog_core::{
    export, Column, CsvFormatter, DefaultMapper, ExceptionSnapshot, ExportExt, FieldKind,
    JsonFormatter, LogEntry, LogEntryMapper, LogEntryQueryExt, LogFormatter, LogLevel, LogModel,
    LogQueryExt, LogStore, ModelMapper, Panicked, TabDelimitedFormatter, TimeoutError,
};
pub use scopelog_storage::SqliteLogStore;
pub use tokio_util::sync::CancellationToken;
