//! Typed helpers for installing post-write hooks

use std::any::{Any, TypeId};
use std::sync::Arc;

use scopelog_core::{LogEntry, LogLevel, LogModel};

use crate::scope::{LoggerScope, OnLogged};

/// Handler for one record shape, used with [`LoggerScope::when_logged_any`].
pub struct TypedHandler {
    model_type: TypeId,
    handler: Box<dyn Fn(&dyn Any) + Send + Sync>,
}

impl TypedHandler {
    pub fn of<M: LogModel>(handler: impl Fn(&M) + Send + Sync + 'static) -> Self {
        Self {
            model_type: TypeId::of::<M>(),
            handler: Box::new(move |record: &dyn Any| {
                if let Some(record) = record.downcast_ref::<M>() {
                    handler(record);
                }
            }),
        }
    }

    fn matches(&self, record: &dyn Any) -> bool {
        Any::type_id(record) == self.model_type
    }
}

impl LoggerScope {
    /// Run `handler` for every record of shape `M`. Replaces the current hook.
    pub fn when_logged<M: LogModel>(&self, handler: impl Fn(&M) + Send + Sync + 'static) -> &Self {
        self.set_on_logged(Some(Arc::new(move |record: &dyn Any| {
            if let Some(record) = record.downcast_ref::<M>() {
                handler(record);
            }
        })));
        self
    }

    /// Dispatch default records to `default` and other shapes to the first
    /// handler registered for them. Replaces the current hook.
    pub fn when_logged_any(
        &self,
        default: impl Fn(&LogEntry) + Send + Sync + 'static,
        handlers: Vec<TypedHandler>,
    ) -> &Self {
        self.set_on_logged(Some(Arc::new(move |record: &dyn Any| {
            if let Some(entry) = record.downcast_ref::<LogEntry>() {
                default(entry);
            } else if let Some(typed) = handlers.iter().find(|h| h.matches(record)) {
                (typed.handler)(record);
            }
        })));
        self
    }

    /// Run `handler` for default records at `Error` level, then whatever
    /// hook was installed before.
    pub fn when_error(&self, handler: impl Fn(&LogEntry) + Send + Sync + 'static) -> &Self {
        let previous: Option<OnLogged> = self.on_logged();
        self.set_on_logged(Some(Arc::new(move |record: &dyn Any| {
            if let Some(entry) = record.downcast_ref::<LogEntry>() {
                if entry.level == LogLevel::Error {
                    handler(entry);
                }
            }
            if let Some(previous) = &previous {
                previous(record);
            }
        })));
        self
    }
}
