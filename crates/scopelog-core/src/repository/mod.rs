//! Storage contract for record shapes
//!
//! The engine needs only three things from a store: create the table for a
//! shape, append one row, and scan the rows of one scope. Rows travel as
//! JSON objects keyed by column name, which keeps the contract independent
//! of any particular database.

use anyhow::Context;
use serde_json::{Map, Value};

use crate::domain::{LogModel, ModelSchema};

/// Result type for store operations
pub type StoreResult<T> = anyhow::Result<T>;

/// One row of a record shape, keyed by column name.
pub type Row = Map<String, Value>;

/// Durable row store keyed by record shape.
pub trait LogStore: Send + Sync {
    /// Create the backing table for `schema`. Must be idempotent.
    fn create_table(&self, schema: &ModelSchema) -> StoreResult<()>;

    /// Append one row. Returns the assigned identifier when the schema
    /// declares an auto-id column.
    fn insert(&self, schema: &ModelSchema, row: &Row) -> StoreResult<Option<i64>>;

    /// All rows of `schema` whose scope column equals `scope`, in insertion order.
    fn scan(&self, schema: &ModelSchema, scope: &str) -> StoreResult<Vec<Row>>;
}

/// Encode a record as a row.
pub fn to_row<M: LogModel>(model: &M) -> StoreResult<Row> {
    match serde_json::to_value(model).context("Failed to serialize log record")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!(
            "Log record {} must serialize to an object, got {}",
            M::schema().type_name,
            other
        ),
    }
}

/// Decode a row back into a record.
pub fn from_row<M: LogModel>(row: Row) -> StoreResult<M> {
    serde_json::from_value(Value::Object(row))
        .with_context(|| format!("Failed to decode {} row", M::schema().type_name))
}
