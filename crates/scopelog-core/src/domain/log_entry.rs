//! The built-in default record shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Column, LogLevel, LogModel};

/// Default log record.
///
/// Carries a severity, a free-text message, an optional JSON dump payload
/// and, for fault dumps, the exception type name plus the serialized
/// [`ExceptionSnapshot`](super::ExceptionSnapshot) tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Assigned by the store on insert (0 until then).
    #[serde(default)]
    pub id: i64,

    pub time: DateTime<Utc>,

    pub level: LogLevel,

    #[serde(default)]
    pub scope: String,

    #[serde(default)]
    pub message: String,

    /// JSON payload of a dumped value
    pub dump_data: Option<String>,

    /// Short type name of the dumped fault (for quick lookups)
    pub exception_type: Option<String>,

    /// Full exception tree (JSON)
    pub exception_data: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_dump_data(mut self, dump_data: impl Into<String>) -> Self {
        self.dump_data = Some(dump_data.into());
        self
    }

    pub fn is_exception(&self) -> bool {
        self.exception_type.is_some()
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self {
            id: 0,
            time: Utc::now(),
            level: LogLevel::None,
            scope: String::new(),
            message: String::new(),
            dump_data: None,
            exception_type: None,
            exception_data: None,
        }
    }
}

impl LogModel for LogEntry {
    const TABLE: Option<&'static str> = Some("App.Log");

    const COLUMNS: &'static [Column] = &[
        Column::id("id").export_ignore(),
        Column::timestamp("time").export_ignore(),
        Column::enumeration("level"),
        Column::text("scope").export_ignore(),
        Column::text("message"),
        Column::text("dump_data"),
        Column::text("exception_type"),
        Column::text("exception_data"),
    ];

    fn time(&self) -> DateTime<Utc> {
        self.time
    }

    fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = time;
    }

    fn scope(&self) -> &str {
        &self.scope
    }

    fn set_scope(&mut self, scope: &str) {
        self.scope = scope.to_string();
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }
}
