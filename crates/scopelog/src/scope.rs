//! Logger scopes: write records under a fixed tag and read them back
//!
//! Every record written through a scope has its `scope` field set to the
//! scope's name and its `time` set to the current instant, whatever the
//! caller put there. Writes and reads of one scope are serialized by a
//! per-scope lock, so a scope can be shared freely across threads.

use std::any::Any;
use std::error::Error;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use scopelog_core::{
    from_row, short_type_name, ExceptionSnapshot, LogEntry, LogLevel, LogModel,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::context::LoggerContext;
use crate::error::{ScopeError, ScopeResult};

/// Hook run after every successful write, with the stamped record.
pub type OnLogged = Arc<dyn Fn(&dyn Any) + Send + Sync>;

pub struct LoggerScope {
    context: Arc<LoggerContext>,
    name: String,
    lock: Mutex<()>,
    on_logged: RwLock<Option<OnLogged>>,
}

impl LoggerScope {
    pub(crate) fn new(context: Arc<LoggerContext>, name: String) -> Self {
        Self {
            context,
            name,
            lock: Mutex::new(()),
            on_logged: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &Arc<LoggerContext> {
        &self.context
    }

    pub fn on_logged(&self) -> Option<OnLogged> {
        self.on_logged.read().clone()
    }

    /// Replace the post-write hook. `None` removes it.
    pub fn set_on_logged(&self, hook: Option<OnLogged>) {
        *self.on_logged.write() = hook;
    }

    /// Stamp and persist `record`, then run the hook.
    ///
    /// Returns the stored record, with its identifier when the shape has one.
    pub fn log<M: LogModel>(&self, mut record: M) -> ScopeResult<M> {
        record.set_scope(&self.name);
        record.set_time(Utc::now());

        let store = self.context.store();
        let mapper = self.context.registry().resolve::<M>(Some(store))?;

        {
            let _guard = self.lock.lock();
            if let Some(id) = mapper.insert(store, &record)? {
                record.assign_id(id);
            }
        }

        // Hook runs outside the lock so it may log again.
        if let Some(hook) = self.on_logged() {
            let stored: &dyn Any = &record;
            hook(stored);
        }
        Ok(record)
    }

    pub fn log_level(&self, level: LogLevel, message: impl Into<String>) -> ScopeResult<LogEntry> {
        self.log(LogEntry::new(level, message))
    }

    /// Serialize `value` to JSON and log it as a default record.
    ///
    /// `extra` is only meaningful for faults; passing it here is rejected
    /// with [`ScopeError::InvalidArgument`] and nothing is written.
    /// Without a message the record reads `Dump of <TypeName>`.
    pub fn dump<V: Serialize + ?Sized>(
        &self,
        value: &V,
        level: LogLevel,
        message: Option<&str>,
        extra: Option<Value>,
    ) -> ScopeResult<LogEntry> {
        if extra.is_some() {
            return Err(ScopeError::InvalidArgument(format!(
                "extra context is only accepted when dumping a fault, not a {}",
                short_type_name::<V>()
            )));
        }

        let message = match message {
            Some(message) => message.to_string(),
            None => format!("Dump of {}", short_type_name::<V>()),
        };
        let entry = LogEntry::new(level, message).with_dump_data(serde_json::to_string(value)?);
        self.log(entry)
    }

    /// Log a fault with its full cause chain.
    ///
    /// Without a message the record carries the fault's own message. `extra`
    /// is serialized into the record's dump payload.
    pub fn dump_fault<E: Error + 'static>(
        &self,
        fault: &E,
        level: LogLevel,
        message: Option<&str>,
        extra: Option<Value>,
    ) -> ScopeResult<LogEntry> {
        self.dump_snapshot(ExceptionSnapshot::from_typed(fault), level, message, extra)
    }

    pub fn dump_anyhow(
        &self,
        fault: &anyhow::Error,
        level: LogLevel,
        message: Option<&str>,
        extra: Option<Value>,
    ) -> ScopeResult<LogEntry> {
        self.dump_snapshot(ExceptionSnapshot::from_anyhow(fault), level, message, extra)
    }

    fn dump_snapshot(
        &self,
        snapshot: ExceptionSnapshot,
        level: LogLevel,
        message: Option<&str>,
        extra: Option<Value>,
    ) -> ScopeResult<LogEntry> {
        let entry = LogEntry {
            message: message.map_or_else(|| snapshot.message.clone(), str::to_string),
            dump_data: extra.map(|e| serde_json::to_string(&e)).transpose()?,
            exception_type: Some(snapshot.type_name.clone()),
            exception_data: Some(serde_json::to_string(&snapshot)?),
            ..LogEntry::new(level, String::new())
        };

        debug!(
            "Dumping {} (depth {}) in scope {}",
            snapshot.type_name,
            snapshot.depth(),
            self.name
        );
        self.log(entry)
    }

    /// Default records of this scope, in insertion order.
    pub fn all(&self) -> ScopeResult<Vec<LogEntry>> {
        self.all_of::<LogEntry>()
    }

    /// Records of shape `M` in this scope, in insertion order.
    pub fn all_of<M: LogModel>(&self) -> ScopeResult<Vec<M>> {
        let store = self.context.store();
        let mapper = self.context.registry().resolve::<M>(Some(store))?;

        let rows = {
            let _guard = self.lock.lock();
            store.scan(mapper.schema(), &self.name)?
        };

        rows.into_iter()
            .map(|row| from_row(row).map_err(ScopeError::from))
            .collect()
    }

    pub fn where_entries(
        &self,
        predicate: impl Fn(&LogEntry) -> bool,
    ) -> ScopeResult<Vec<LogEntry>> {
        self.where_of(predicate)
    }

    pub fn where_of<M: LogModel>(&self, predicate: impl Fn(&M) -> bool) -> ScopeResult<Vec<M>> {
        let mut records = self.all_of::<M>()?;
        records.retain(|r| predicate(r));
        Ok(records)
    }

    /// Fault records whose exception type is `E`, newest first.
    pub fn exception_logs<E: ?Sized + 'static>(&self) -> ScopeResult<Vec<LogEntry>> {
        let type_name = short_type_name::<E>();
        let mut entries =
            self.where_entries(|e| e.exception_type.as_deref() == Some(type_name))?;
        entries.sort_by(|a, b| b.time.cmp(&a.time).then(b.id.cmp(&a.id)));
        Ok(entries)
    }
}

impl std::fmt::Debug for LoggerScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerScope")
            .field("name", &self.name)
            .field("has_hook", &self.on_logged.read().is_some())
            .finish()
    }
}
