//! Mapper registry tests against an in-memory store

use std::sync::{Arc, Barrier};

use pretty_assertions::assert_eq;
use scopelog_core::{DefaultMapper, LogEntry, LogStore, MapperRegistry, ModelMapper};
use tests::fixtures::{product, Assembly, ProductLog};
use tests::{LoggerContext, MemoryLogStore};

fn mapper_addr(mapper: &Arc<dyn ModelMapper>) -> *const () {
    Arc::as_ptr(mapper) as *const ()
}

#[test]
fn test_concurrent_resolve_creates_table_once() {
    let store = Arc::new(MemoryLogStore::new());
    let registry = Arc::new(MapperRegistry::new());
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            let registry = registry.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                let store: &dyn LogStore = store.as_ref();
                registry.resolve::<ProductLog>(Some(store)).unwrap()
            })
        })
        .collect();

    let mappers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(store.create_table_calls(), 1);
    let first = mapper_addr(&mappers[0]);
    assert!(mappers.iter().all(|m| mapper_addr(m) == first));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_first_registration_wins() {
    let store = MemoryLogStore::new();
    let registry = MapperRegistry::new();

    let first: Arc<dyn ModelMapper> = Arc::new(DefaultMapper::<ProductLog>::new());
    let second: Arc<dyn ModelMapper> = Arc::new(DefaultMapper::<ProductLog>::new());

    assert!(registry.register(first.clone(), Some(&store)).unwrap());
    assert!(!registry.register(second, Some(&store)).unwrap());

    let resolved = registry.resolve::<ProductLog>(Some(&store)).unwrap();
    assert_eq!(mapper_addr(&resolved), mapper_addr(&first));
    assert_eq!(store.create_table_calls(), 1);
}

#[test]
fn test_context_over_mock_store() {
    let store = Arc::new(MemoryLogStore::new());
    let context = LoggerContext::with_store(store.clone(), Vec::new()).unwrap();
    let scope = context.begin_scope::<Assembly>();

    // Default record table is created up front
    assert_eq!(store.table_names(), vec!["App.Log"]);

    scope.log(product("L-1", "Widget")).unwrap();
    scope.log(product("L-2", "Gadget")).unwrap();
    scope
        .log(LogEntry::new(tests::LogLevel::Information, "done"))
        .unwrap();

    assert_eq!(store.create_table_calls(), 2);
    assert_eq!(store.table_names(), vec!["App.Log", "App.ProductLog"]);
    assert_eq!(store.rows("App.ProductLog").len(), 2);
    assert_eq!(store.rows("App.Log")[0]["id"], 1);
}

#[test]
fn test_storage_failure_propagates() {
    let store = Arc::new(MemoryLogStore::new());
    let context = LoggerContext::with_store(store.clone(), Vec::new()).unwrap();
    let scope = context.begin_scope::<Assembly>();

    store.fail_inserts(true);
    let err = scope
        .log_level(tests::LogLevel::Error, "lost")
        .unwrap_err();

    assert!(matches!(err, scopelog::ScopeError::Storage(_)));
    assert!(err.to_string().contains("store unavailable"));
}
