//! SQL derived from record schemas, plus the row codec.
//!
//! | FieldKind                | Column type | Encoding                  |
//! |--------------------------|-------------|---------------------------|
//! | Integer                  | INTEGER     | as is                     |
//! | Real                     | REAL        | as is                     |
//! | Bool                     | INTEGER     | 0 / 1                     |
//! | Text, Enum, Timestamp    | TEXT        | JSON string value         |
//! | Json                     | TEXT        | compact JSON              |

use anyhow::Result;
use rusqlite::types::{Value as SqlValue, ValueRef};
use scopelog_core::{Column, FieldKind, ModelSchema, SCOPE_FIELD};
use serde_json::Value;

/// Double-quote an identifier so names like `App.Log` are taken literally.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_type(column: &Column) -> &'static str {
    if column.auto_id {
        return "INTEGER PRIMARY KEY AUTOINCREMENT";
    }
    match column.kind {
        FieldKind::Integer | FieldKind::Bool => "INTEGER",
        FieldKind::Real => "REAL",
        FieldKind::Text | FieldKind::Enum | FieldKind::Timestamp | FieldKind::Json => "TEXT",
    }
}

pub fn create_table_sql(schema: &ModelSchema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(c.name), sql_type(c)))
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(&schema.table),
        columns.join(", ")
    )
}

pub fn create_scope_index_sql(schema: &ModelSchema) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
        quote_ident(&format!("idx_{}_scope", schema.table)),
        quote_ident(&schema.table),
        quote_ident(SCOPE_FIELD)
    )
}

pub fn insert_sql(schema: &ModelSchema) -> String {
    let names: Vec<String> = schema
        .writable_columns()
        .map(|c| quote_ident(c.name))
        .collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(&schema.table),
        names.join(", "),
        placeholders.join(", ")
    )
}

pub fn select_by_scope_sql(schema: &ModelSchema) -> String {
    let names: Vec<String> = schema.columns.iter().map(|c| quote_ident(c.name)).collect();

    format!(
        "SELECT {} FROM {} WHERE {} = ?1 ORDER BY rowid",
        names.join(", "),
        quote_ident(&schema.table),
        quote_ident(SCOPE_FIELD)
    )
}

/// Encode one JSON field value for binding.
pub fn to_sql(column: &Column, value: Option<&Value>) -> Result<SqlValue> {
    let value = match value {
        None | Some(Value::Null) => return Ok(SqlValue::Null),
        Some(v) => v,
    };

    let encoded = match (column.kind, value) {
        (FieldKind::Bool, Value::Bool(b)) => SqlValue::Integer(i64::from(*b)),
        (FieldKind::Integer | FieldKind::Bool, Value::Number(n)) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => anyhow::bail!("Column {} value {} does not fit in i64", column.name, n),
        },
        (FieldKind::Real, Value::Number(n)) => match n.as_f64() {
            Some(f) => SqlValue::Real(f),
            None => anyhow::bail!("Column {} value {} is not a real number", column.name, n),
        },
        (FieldKind::Json, v) => SqlValue::Text(serde_json::to_string(v)?),
        (_, Value::String(s)) => SqlValue::Text(s.clone()),
        (_, v) => SqlValue::Text(v.to_string()),
    };
    Ok(encoded)
}

/// Decode one column value back to JSON.
pub fn from_sql(column: &Column, value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) if column.kind == FieldKind::Bool => Value::Bool(i != 0),
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            if column.kind == FieldKind::Json {
                serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.into_owned()))
            } else {
                Value::String(text.into_owned())
            }
        }
        ValueRef::Blob(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}
