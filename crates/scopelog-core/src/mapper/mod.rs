//! Type-indexed registry of per-shape insert adapters
//!
//! The registry hands out one [`ModelMapper`] per record type. A mapper for
//! a type nobody registered is built on first use, and its backing table is
//! created before the mapper becomes visible to anyone else:
//!
//! ```text
//! resolve::<M>()
//!   ├─ read lock: hit?  ──────────────────────────────► return
//!   └─ init lock
//!        ├─ re-check: hit? ───────────────────────────► return
//!        ├─ construct DefaultMapper<M>
//!        ├─ store.create_table(schema)   (if a store is attached)
//!        └─ publish under write lock ─────────────────► return
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Context;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::domain::{LogEntry, LogModel, ModelSchema};
use crate::repository::{from_row, to_row, LogStore, StoreResult};

/// Knows how to persist records of one shape.
pub trait ModelMapper: Send + Sync {
    /// The record type this mapper handles.
    fn model_type(&self) -> TypeId;

    fn schema(&self) -> &ModelSchema;

    /// Persist `model`. A record of any other type is ignored and yields `Ok(None)`.
    fn insert(&self, store: &dyn LogStore, model: &dyn Any) -> StoreResult<Option<i64>>;
}

/// Reflection-based mapper: encodes the record through its serde representation.
pub struct DefaultMapper<M> {
    schema: ModelSchema,
    _marker: PhantomData<fn() -> M>,
}

/// Mapper for the built-in default record.
pub type LogEntryMapper = DefaultMapper<LogEntry>;

impl<M: LogModel> DefaultMapper<M> {
    pub fn new() -> Self {
        Self {
            schema: M::schema(),
            _marker: PhantomData,
        }
    }

    /// Rows that would not decode back into `M` (a non-finite float turns
    /// into `null`, for instance) are rejected before they reach the table.
    pub fn insert_model(&self, store: &dyn LogStore, model: &M) -> StoreResult<Option<i64>> {
        let row = to_row(model)?;
        from_row::<M>(row.clone()).with_context(|| {
            format!("{} record would not be readable once stored", self.schema.type_name)
        })?;
        store.insert(&self.schema, &row)
    }
}

impl<M: LogModel> Default for DefaultMapper<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: LogModel> ModelMapper for DefaultMapper<M> {
    fn model_type(&self) -> TypeId {
        TypeId::of::<M>()
    }

    fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    fn insert(&self, store: &dyn LogStore, model: &dyn Any) -> StoreResult<Option<i64>> {
        match model.downcast_ref::<M>() {
            Some(model) => self.insert_model(store, model),
            None => {
                debug!(
                    "Mapper for {} ignored a record of another type",
                    self.schema.type_name
                );
                Ok(None)
            }
        }
    }
}

/// Process-scoped table of mappers keyed by record type.
#[derive(Default)]
pub struct MapperRegistry {
    mappers: RwLock<HashMap<TypeId, Arc<dyn ModelMapper>>>,
    init_lock: Mutex<()>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapper explicitly. The first registration for a type wins;
    /// later ones are ignored and return `Ok(false)`.
    ///
    /// When a store is given, the table is created before the mapper is published.
    pub fn register(
        &self,
        mapper: Arc<dyn ModelMapper>,
        store: Option<&dyn LogStore>,
    ) -> StoreResult<bool> {
        let model_type = mapper.model_type();
        if self.mappers.read().contains_key(&model_type) {
            return Ok(false);
        }

        let _guard = self.init_lock.lock();
        if self.mappers.read().contains_key(&model_type) {
            return Ok(false);
        }

        if let Some(store) = store {
            store.create_table(mapper.schema())?;
        }

        info!("Registered log mapper for {}", mapper.schema().type_name);
        self.mappers.write().insert(model_type, mapper);
        Ok(true)
    }

    /// Get the mapper for `M`, building a [`DefaultMapper`] on first use.
    pub fn resolve<M: LogModel>(
        &self,
        store: Option<&dyn LogStore>,
    ) -> StoreResult<Arc<dyn ModelMapper>> {
        let model_type = TypeId::of::<M>();

        // Fast path: mapper exists
        if let Some(mapper) = self.get(model_type) {
            return Ok(mapper);
        }

        // Slow path: serialize construction and table creation
        let _guard = self.init_lock.lock();
        if let Some(mapper) = self.get(model_type) {
            return Ok(mapper);
        }

        let mapper: Arc<dyn ModelMapper> = Arc::new(DefaultMapper::<M>::new());
        if let Some(store) = store {
            store.create_table(mapper.schema())?;
        }

        debug!("Created default log mapper for {}", mapper.schema().type_name);
        self.mappers.write().insert(model_type, mapper.clone());
        Ok(mapper)
    }

    pub fn get(&self, model_type: TypeId) -> Option<Arc<dyn ModelMapper>> {
        self.mappers.read().get(&model_type).cloned()
    }

    pub fn contains<M: LogModel>(&self) -> bool {
        self.mappers.read().contains_key(&TypeId::of::<M>())
    }

    pub fn len(&self) -> usize {
        self.mappers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.read().is_empty()
    }
}
