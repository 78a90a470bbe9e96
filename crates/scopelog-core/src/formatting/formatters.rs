//! Line formatters: CSV, JSON and tab-delimited

use chrono::DateTime;
use lazy_static::lazy_static;
use serde_json::{Map, Value};

use super::Field;
use crate::domain::FieldKind;

/// Timestamp rendering shared by the CSV and tab formatters.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders an ordered field list as one line of output.
pub trait LogFormatter: Send + Sync {
    /// Optional line written once before all records.
    fn header(&self) -> Option<&str>;

    fn format(&self, fields: &[Field]) -> String;
}

lazy_static! {
    static ref CSV: CsvFormatter = CsvFormatter::new();
    static ref JSON: JsonFormatter = JsonFormatter;
    static ref TABS: TabDelimitedFormatter = TabDelimitedFormatter::new();
}

/// Shared CSV formatter (no header).
pub fn csv() -> &'static CsvFormatter {
    &CSV
}

/// Shared JSON formatter.
pub fn json() -> &'static JsonFormatter {
    &JSON
}

/// Shared tab-delimited formatter (no header).
pub fn tabs() -> &'static TabDelimitedFormatter {
    &TABS
}

/// Comma-separated values. Text and JSON fields are double-quoted with
/// embedded quotes doubled.
#[derive(Debug, Clone, Default)]
pub struct CsvFormatter {
    header: Option<String>,
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
        }
    }

    fn render(field: &Field) -> String {
        let Some(value) = &field.value else {
            return String::new();
        };

        match field.kind {
            FieldKind::Text | FieldKind::Json => {
                format!("\"{}\"", render_plain(value).replace('"', "\"\""))
            }
            FieldKind::Timestamp => render_timestamp(value),
            _ => render_plain(value),
        }
    }
}

impl LogFormatter for CsvFormatter {
    fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    fn format(&self, fields: &[Field]) -> String {
        fields.iter().map(Self::render).collect::<Vec<_>>().join(",")
    }
}

/// One pretty-printed JSON object per record, keyed by field name.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl LogFormatter for JsonFormatter {
    fn header(&self) -> Option<&str> {
        None
    }

    fn format(&self, fields: &[Field]) -> String {
        let object: Map<String, Value> = fields
            .iter()
            .map(|field| {
                let value = field
                    .value
                    .clone()
                    .unwrap_or_else(|| Value::String(String::new()));
                (field.name.to_string(), value)
            })
            .collect();

        serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_default()
    }
}

/// Tab-separated values, no quoting.
#[derive(Debug, Clone, Default)]
pub struct TabDelimitedFormatter {
    header: Option<String>,
}

impl TabDelimitedFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
        }
    }

    fn render(field: &Field) -> String {
        match (&field.value, field.kind) {
            (None, _) => String::new(),
            (Some(value), FieldKind::Timestamp) => render_timestamp(value),
            (Some(value), _) => render_plain(value),
        }
    }
}

impl LogFormatter for TabDelimitedFormatter {
    fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    fn format(&self, fields: &[Field]) -> String {
        fields.iter().map(Self::render).collect::<Vec<_>>().join("\t")
    }
}

/// Strings verbatim, everything else in its JSON rendering.
fn render_plain(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_timestamp(value: &Value) -> String {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|_| s.clone()),
        other => render_plain(other),
    }
}
