//! Field extraction: record → ordered (name, value, kind) triples

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::warn;

use crate::domain::{Column, FieldKind, LogModel, BASE_FIELDS};

lazy_static! {
    /// Export column order per record type. Append-only.
    static ref FIELD_CACHE: RwLock<HashMap<TypeId, Arc<[Column]>>> = RwLock::new(HashMap::new());
}

/// One extracted field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    /// `None` when the record holds no value (null) for this field.
    pub value: Option<Value>,
    pub kind: FieldKind,
}

/// Extract the exportable fields of `record`.
///
/// Base contract fields come first (`time`, then `scope`), followed by the
/// remaining columns in declaration order. Export-ignored columns are dropped.
pub fn extract<M: LogModel>(record: &M) -> Vec<Field> {
    let columns = export_columns::<M>();

    let object = match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Default::default(),
        Err(e) => {
            warn!("Failed to serialize record for export: {}", e);
            Default::default()
        }
    };

    columns
        .iter()
        .map(|column| Field {
            name: column.name,
            value: object.get(column.name).filter(|v| !v.is_null()).cloned(),
            kind: column.kind,
        })
        .collect()
}

/// Ordered export columns of `M`, computed once per type.
pub fn export_columns<M: LogModel>() -> Arc<[Column]> {
    let type_id = TypeId::of::<M>();

    if let Some(columns) = FIELD_CACHE.read().get(&type_id) {
        return columns.clone();
    }

    let ordered: Arc<[Column]> = order_columns(M::COLUMNS).into();
    FIELD_CACHE
        .write()
        .entry(type_id)
        .or_insert(ordered)
        .clone()
}

fn order_columns(columns: &[Column]) -> Vec<Column> {
    let mut ordered: Vec<Column> = columns
        .iter()
        .filter(|c| !c.export_ignore)
        .copied()
        .collect();
    // Stable sort keeps declaration order among non-base columns
    ordered.sort_by_key(|c| {
        BASE_FIELDS
            .iter()
            .position(|base| *base == c.name)
            .unwrap_or(BASE_FIELDS.len())
    });
    ordered
}
