//! The record contract every loggable shape implements.
//!
//! A shape describes itself through a static column list. The column list
//! drives table creation, row encoding and field extraction for export, so
//! column names must match the serde field names of the record.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Name of the timestamp column every shape must declare.
pub const TIME_FIELD: &str = "time";

/// Name of the scope column every shape must declare.
pub const SCOPE_FIELD: &str = "scope";

/// Base contract fields in contract order.
pub const BASE_FIELDS: [&str; 2] = [TIME_FIELD, SCOPE_FIELD];

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Integer,
    Real,
    Bool,
    /// Free text. Quoted by the CSV formatter.
    Text,
    /// Unit-only enum serialized by variant name. Stored as text, rendered unquoted.
    Enum,
    /// `DateTime<Utc>` serialized as RFC 3339.
    Timestamp,
    /// Any nested value, stored as compact JSON text.
    Json,
}

/// A single column of a record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Persisted, but left out of every rendered export.
    pub export_ignore: bool,
    /// Auto-increment identifier assigned by the store on insert.
    pub auto_id: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            export_ignore: false,
            auto_id: false,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub const fn real(name: &'static str) -> Self {
        Self::new(name, FieldKind::Real)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn enumeration(name: &'static str) -> Self {
        Self::new(name, FieldKind::Enum)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    pub const fn json(name: &'static str) -> Self {
        Self::new(name, FieldKind::Json)
    }

    /// Auto-increment integer primary key.
    pub const fn id(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
            export_ignore: false,
            auto_id: true,
        }
    }

    /// Mark the column as excluded from exports.
    pub const fn export_ignore(mut self) -> Self {
        self.export_ignore = true;
        self
    }

    pub fn is_base(&self) -> bool {
        BASE_FIELDS.contains(&self.name)
    }
}

/// Resolved storage layout of one record shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    pub table: String,
    pub type_name: &'static str,
    pub columns: &'static [Column],
}

impl ModelSchema {
    /// Build the schema of `M`. The table name is the explicit override when
    /// the shape declares one, otherwise the short type name.
    pub fn of<M: LogModel>() -> Self {
        let type_name = short_type_name::<M>();
        Self {
            table: M::TABLE.unwrap_or(type_name).to_string(),
            type_name,
            columns: M::COLUMNS,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn auto_id(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.auto_id)
    }

    /// Columns written on insert (everything except the auto identifier).
    pub fn writable_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.auto_id)
    }
}

/// Minimal contract of a loggable record.
///
/// `time` and `scope` are overwritten by the engine on every write; whatever
/// the caller put there is discarded. `COLUMNS` must contain a `time`
/// timestamp column and a `scope` text column.
///
/// ```rust,ignore
/// #[derive(Clone, Serialize, Deserialize)]
/// struct ProductLog {
///     scope: String,
///     time: DateTime<Utc>,
///     lot_id: String,
///     product_name: String,
/// }
///
/// impl LogModel for ProductLog {
///     const TABLE: Option<&'static str> = Some("App.ProductLog");
///     const COLUMNS: &'static [Column] = &[
///         Column::text("scope").export_ignore(),
///         Column::timestamp("time").export_ignore(),
///         Column::text("lot_id"),
///         Column::text("product_name"),
///     ];
///     // accessors...
/// }
/// ```
pub trait LogModel: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Explicit table name. Defaults to the short type name.
    const TABLE: Option<&'static str> = None;

    /// Columns in declaration order.
    const COLUMNS: &'static [Column];

    fn time(&self) -> DateTime<Utc>;
    fn set_time(&mut self, time: DateTime<Utc>);
    fn scope(&self) -> &str;
    fn set_scope(&mut self, scope: &str);

    /// Receives the identifier assigned by the store, if the shape has one.
    fn assign_id(&mut self, _id: i64) {}

    fn schema() -> ModelSchema {
        ModelSchema::of::<Self>()
    }
}

/// Last path segment of `T`'s type name, without generic arguments.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    short_name(std::any::type_name::<T>())
}

/// Strip the module path and generic arguments from a type path.
pub fn short_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
