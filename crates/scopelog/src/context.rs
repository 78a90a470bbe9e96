//! Logger context: owns the store and the mapper registry, hands out scopes
//!
//! A context is usually created once per process through [`initialize`] (or
//! lazily by [`begin_scope`]), but independent contexts can be built with
//! [`LoggerContext::open`] or [`LoggerContext::with_store`], which is what
//! tests do.

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;
use scopelog_core::{short_type_name, LogEntryMapper, LogStore, MapperRegistry, ModelMapper};
use scopelog_storage::SqliteLogStore;
use tracing::{debug, info};

use crate::config::LoggerConfig;
use crate::error::ScopeResult;
use crate::scope::LoggerScope;

/// Marker type naming the default scope.
pub struct DefaultScope;

pub struct LoggerContext {
    store: Arc<dyn LogStore>,
    registry: MapperRegistry,
}

impl LoggerContext {
    /// Open the database described by `config`.
    pub fn open(config: &LoggerConfig) -> ScopeResult<Arc<Self>> {
        Self::open_with_mappers(config, Vec::new())
    }

    /// Open the database and register extra mappers up front.
    pub fn open_with_mappers(
        config: &LoggerConfig,
        mappers: Vec<Arc<dyn ModelMapper>>,
    ) -> ScopeResult<Arc<Self>> {
        let store = if config.in_memory {
            SqliteLogStore::open_in_memory()?
        } else {
            let path = config.database_path();
            info!("Opening log database at {:?}", path);
            SqliteLogStore::open(&path)?
        };
        Self::with_store(Arc::new(store), mappers)
    }

    /// Build a context over any store.
    ///
    /// The default record's mapper is registered first, so a caller-supplied
    /// mapper for `LogEntry` is ignored.
    pub fn with_store(
        store: Arc<dyn LogStore>,
        mappers: Vec<Arc<dyn ModelMapper>>,
    ) -> ScopeResult<Arc<Self>> {
        let registry = MapperRegistry::new();
        registry.register(Arc::new(LogEntryMapper::new()), Some(store.as_ref()))?;

        for mapper in mappers {
            let name = mapper.schema().type_name;
            if !registry.register(mapper, Some(store.as_ref()))? {
                debug!("Mapper for {} already registered, ignoring", name);
            }
        }

        Ok(Arc::new(Self { store, registry }))
    }

    pub fn store(&self) -> &dyn LogStore {
        self.store.as_ref()
    }

    pub fn registry(&self) -> &MapperRegistry {
        &self.registry
    }

    /// Register a mapper after construction. First registration wins.
    pub fn register_mapper(&self, mapper: Arc<dyn ModelMapper>) -> ScopeResult<bool> {
        Ok(self.registry.register(mapper, Some(self.store()))?)
    }

    /// Scope tagged with the short name of `T`.
    pub fn begin_scope<T: ?Sized + 'static>(self: &Arc<Self>) -> LoggerScope {
        self.begin_named_scope(short_type_name::<T>())
    }

    pub fn begin_named_scope(self: &Arc<Self>, name: impl Into<String>) -> LoggerScope {
        LoggerScope::new(self.clone(), name.into())
    }

    pub fn begin_default_scope(self: &Arc<Self>) -> LoggerScope {
        self.begin_scope::<DefaultScope>()
    }
}

lazy_static! {
    static ref GLOBAL: Mutex<Option<Arc<LoggerContext>>> = Mutex::new(None);
}

/// Create the process-wide context. Later calls return the existing one and
/// ignore their arguments.
pub fn initialize(
    config: &LoggerConfig,
    mappers: Vec<Arc<dyn ModelMapper>>,
) -> ScopeResult<Arc<LoggerContext>> {
    let mut global = GLOBAL.lock();
    if let Some(context) = global.as_ref() {
        debug!("Logger already initialized");
        return Ok(context.clone());
    }

    let context = LoggerContext::open_with_mappers(config, mappers)?;
    *global = Some(context.clone());
    info!("Logger initialized");
    Ok(context)
}

/// The process-wide context, initialized from the environment on first use.
pub fn global() -> ScopeResult<Arc<LoggerContext>> {
    if let Some(context) = GLOBAL.lock().as_ref() {
        return Ok(context.clone());
    }
    initialize(&LoggerConfig::from_env(), Vec::new())
}

pub fn is_initialized() -> bool {
    GLOBAL.lock().is_some()
}

/// Drop the process-wide context so the next use re-initializes.
///
/// Scopes already handed out keep their context alive.
pub fn teardown() -> Option<Arc<LoggerContext>> {
    GLOBAL.lock().take()
}

/// Scope on the process-wide context tagged with the short name of `T`.
pub fn begin_scope<T: ?Sized + 'static>() -> ScopeResult<LoggerScope> {
    Ok(global()?.begin_scope::<T>())
}

pub fn begin_default_scope() -> ScopeResult<LoggerScope> {
    Ok(global()?.begin_default_scope())
}
