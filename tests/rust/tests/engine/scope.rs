//! Stamping and query tests

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use scopelog::{Column, LogEntryQueryExt, LogModel, LogQueryExt, ScopeError};
use tests::db::TestContext;
use tests::fixtures::{product, Assembly, Inspection, ProductLog};
use tests::{LogEntry, LogLevel};

#[test]
fn test_engine_overwrites_scope_and_time() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();

    let mut forged = product("L-9", "Valve");
    forged.scope = "Inspection".to_string();
    forged.time = Utc::now() + Duration::days(365);

    let start = Utc::now();
    scope.log(forged).unwrap();
    let end = Utc::now();

    let stored = scope.all_of::<ProductLog>().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].scope, "Assembly");
    assert!(stored[0].time >= start && stored[0].time <= end);

    let other = test_ctx.context.begin_scope::<Inspection>();
    assert!(other.all_of::<ProductLog>().unwrap().is_empty());
}

#[test]
fn test_named_and_default_scopes() {
    let test_ctx = TestContext::in_memory();
    let named = test_ctx.context.begin_named_scope("Line-3");
    let default = test_ctx.context.begin_default_scope();

    let entry = named.log_level(LogLevel::Warning, "jam").unwrap();
    assert_eq!(entry.scope, "Line-3");

    let entry = default.log_level(LogLevel::Information, "idle").unwrap();
    assert_eq!(entry.scope, "DefaultScope");
}

#[test]
fn test_query_helpers_over_scope_results() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();

    scope.log_level(LogLevel::Information, "start").unwrap();
    scope.log_level(LogLevel::Error, "jam").unwrap();
    scope.log_level(LogLevel::Information, "resume").unwrap();

    let errors = scope.all().unwrap().of_level(LogLevel::Error);
    assert_eq!(errors.len(), 1);

    let recent: Vec<String> = scope
        .all()
        .unwrap()
        .recent(2)
        .into_iter()
        .map(|e: LogEntry| e.message)
        .collect();
    assert_eq!(recent, vec!["resume", "jam"]);

    assert_eq!(scope.all().unwrap().today().len(), 3);
}

#[test]
fn test_shared_scope_across_threads() {
    let test_ctx = TestContext::new();
    let scope = std::sync::Arc::new(test_ctx.context.begin_scope::<Assembly>());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let scope = scope.clone();
            std::thread::spawn(move || {
                for n in 0..25 {
                    scope
                        .log(product(&format!("W{}-{}", worker, n), "Valve"))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(scope.all_of::<ProductLog>().unwrap().len(), 100);
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct GaugeLog {
    scope: String,
    time: chrono::DateTime<Utc>,
    pressure: f64,
}

impl LogModel for GaugeLog {
    const COLUMNS: &'static [Column] = &[
        Column::text("scope"),
        Column::timestamp("time"),
        Column::real("pressure"),
    ];

    fn time(&self) -> chrono::DateTime<Utc> {
        self.time
    }
    fn set_time(&mut self, time: chrono::DateTime<Utc>) {
        self.time = time;
    }
    fn scope(&self) -> &str {
        &self.scope
    }
    fn set_scope(&mut self, scope: &str) {
        self.scope = scope.to_string();
    }
}

fn gauge(pressure: f64) -> GaugeLog {
    GaugeLog {
        scope: String::new(),
        time: Utc::now(),
        pressure,
    }
}

#[test]
fn test_unreadable_record_is_rejected_and_scope_stays_readable() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();

    scope.log(gauge(2.5)).unwrap();
    let err = scope.log(gauge(f64::NAN)).unwrap_err();
    assert!(matches!(err, ScopeError::Storage(_)));
    assert!(scope.log(gauge(f64::INFINITY)).is_err());

    let stored = scope.all_of::<GaugeLog>().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].pressure, 2.5);
}
