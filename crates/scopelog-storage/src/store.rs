//! SQLite implementation of LogStore.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::params_from_iter;
use scopelog_core::{LogStore, ModelSchema, Row, StoreResult};
use tracing::debug;

use crate::schema::{
    create_scope_index_sql, create_table_sql, from_sql, insert_sql, select_by_scope_sql, to_sql,
};
use crate::Database;

/// SQLite-backed log store.
///
/// Every record shape gets its own table, named after the shape. The
/// connection is shared behind a mutex, so single-row inserts are atomic
/// with respect to each other.
pub struct SqliteLogStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteLogStore {
    /// Create a store over an already opened database.
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::open(path)?;
        Ok(Self::new(Arc::new(Mutex::new(db))))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self::new(Arc::new(Mutex::new(db))))
    }

    /// Shared handle to the underlying database.
    pub fn database(&self) -> Arc<Mutex<Database>> {
        self.db.clone()
    }
}

impl LogStore for SqliteLogStore {
    fn create_table(&self, schema: &ModelSchema) -> StoreResult<()> {
        let db = self.db.lock();

        db.transaction(|conn| {
            conn.execute(&create_table_sql(schema), [])?;
            if schema.column(scopelog_core::SCOPE_FIELD).is_some() {
                conn.execute(&create_scope_index_sql(schema), [])?;
            }
            Ok(())
        })
        .with_context(|| format!("Failed to create table {}", schema.table))?;

        debug!("Ensured table {} for {}", schema.table, schema.type_name);
        Ok(())
    }

    fn insert(&self, schema: &ModelSchema, row: &Row) -> StoreResult<Option<i64>> {
        let values = schema
            .writable_columns()
            .map(|column| to_sql(column, row.get(column.name)))
            .collect::<Result<Vec<_>>>()?;

        let db = self.db.lock();
        let conn = db.connection();

        conn.execute(&insert_sql(schema), params_from_iter(values.iter()))
            .with_context(|| format!("Failed to insert into {}", schema.table))?;

        Ok(schema.auto_id().map(|_| conn.last_insert_rowid()))
    }

    fn scan(&self, schema: &ModelSchema, scope: &str) -> StoreResult<Vec<Row>> {
        let db = self.db.lock();
        let conn = db.connection();

        let mut stmt = conn
            .prepare(&select_by_scope_sql(schema))
            .with_context(|| format!("Failed to query {}", schema.table))?;

        let rows = stmt
            .query_map([scope], |sql_row| {
                let mut row = Row::new();
                for (i, column) in schema.columns.iter().enumerate() {
                    row.insert(column.name.to_string(), from_sql(column, sql_row.get_ref(i)?));
                }
                Ok(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
