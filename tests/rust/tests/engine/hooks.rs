//! Post-write hook and tracing bridge tests

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use scopelog::{ScopeLayer, TypedHandler};
use tests::db::TestContext;
use tests::faults::station_failure;
use tests::fixtures::{product, Assembly, ProductLog};
use tests::{LogEntry, LogLevel};
use tracing_subscriber::layer::SubscriberExt;

#[test]
fn test_typed_dispatch() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));

    let entries = seen.clone();
    let products = seen.clone();
    scope.when_logged_any(
        move |e: &LogEntry| entries.lock().push(format!("{}:{}", e.level, e.message)),
        vec![TypedHandler::of::<ProductLog>(move |p| {
            products.lock().push(format!("product:{}:{}", p.lot_id, p.scope))
        })],
    );

    scope.log(product("L-5", "Valve")).unwrap();
    scope.log_level(LogLevel::Warning, "low stock").unwrap();

    assert_eq!(
        *seen.lock(),
        vec!["product:L-5:Assembly", "Warning:low stock"]
    );
}

#[test]
fn test_error_hook_sees_error_level_entries() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();
    let failures = Arc::new(Mutex::new(Vec::new()));

    let sink = failures.clone();
    scope.when_error(move |e| sink.lock().push(e.exception_type.clone()));

    scope
        .guarded_call(
            || -> anyhow::Result<()> { Err(station_failure().into()) },
            Some("calibrate"),
            true,
        )
        .unwrap();
    scope.log_level(LogLevel::Warning, "below threshold").unwrap();
    scope.log_level(LogLevel::Error, "not a fault").unwrap();

    assert_eq!(
        *failures.lock(),
        vec![Some("StationError".to_string()), None]
    );
}

#[test]
#[should_panic(expected = "hook failed")]
fn test_hook_panic_reaches_caller() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();

    scope.when_logged::<LogEntry>(|_| panic!("hook failed"));
    let _ = scope.log_level(LogLevel::Information, "boom");
}

#[test]
fn test_tracing_events_are_persisted() {
    let test_ctx = TestContext::in_memory();
    let scope = Arc::new(test_ctx.context.begin_scope::<Assembly>());
    let subscriber = tracing_subscriber::registry()
        .with(ScopeLayer::new(scope.clone()).with_min_level(LogLevel::Information));

    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!(target: "line", "ignored");
        tracing::info!(target: "line", station = 4, "station ready");
        tracing::error!(target: "line", reason = "jam", "station stopped");
    });

    let entries = scope.all().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "station ready");
    assert_eq!(entries[0].dump_data.as_deref(), Some("{\"station\":4}"));
    assert_eq!(entries[1].level, LogLevel::Error);
    assert_eq!(entries[1].scope, "Assembly");
}
