//! Bridge from `tracing` events into a logger scope
//!
//! Install [`ScopeLayer`] on a subscriber and every event becomes a default
//! record in the bound scope: the `message` field is the record message and
//! all other fields are stored as a JSON object in `dump_data`.

use std::fmt::Write;
use std::sync::Arc;

use scopelog_core::{LogEntry, LogLevel};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::scope::LoggerScope;

/// Events from these crates are never forwarded, so writing a record can
/// not feed back into the layer.
const OWN_CRATES: &[&str] = &["scopelog", "scopelog_core", "scopelog_storage"];

fn is_own_target(target: &str) -> bool {
    OWN_CRATES.iter().any(|name| {
        target
            .strip_prefix(name)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

pub struct ScopeLayer {
    scope: Arc<LoggerScope>,
    min_level: LogLevel,
}

impl ScopeLayer {
    pub fn new(scope: Arc<LoggerScope>) -> Self {
        Self {
            scope,
            min_level: LogLevel::Trace,
        }
    }

    /// Drop events less severe than `level`.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }
}

impl<S: Subscriber> Layer<S> for ScopeLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_own_target(metadata.target()) {
            return;
        }

        let level = LogLevel::from_tracing(metadata.level());
        if level < self.min_level {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let mut entry = LogEntry::new(level, visitor.message.unwrap_or_default());
        if !visitor.fields.is_empty() {
            entry.dump_data = Some(Value::Object(visitor.fields).to_string());
        }

        if let Err(e) = self.scope.log(entry) {
            eprintln!(
                "scopelog: failed to persist event from {}: {}",
                metadata.target(),
                e
            );
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut buf = String::new();
        let _ = write!(&mut buf, "{:?}", value);

        if field.name() == "message" {
            self.message = Some(buf);
        } else {
            self.fields.insert(field.name().to_string(), Value::String(buf));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.fields.insert(field.name().to_string(), Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::Bool(value));
    }
}
