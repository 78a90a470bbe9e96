//! Guarded execution and timeout tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use scopelog::{CancellationToken, ExceptionSnapshot, TimeoutError};
use tests::async_helpers::{with_timeout, DEFAULT_TIMEOUT};
use tests::db::TestContext;
use tests::faults::{station_failure, StationError};
use tests::fixtures::Assembly;
use tests::LogLevel;

#[test]
fn test_sleeping_action_times_out() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();

    let started = Instant::now();
    let timed_out = scope
        .with_timeout(
            |_token: CancellationToken| {
                std::thread::sleep(Duration::from_millis(5000));
                Ok(())
            },
            3000,
            Some("press"),
            true,
        )
        .unwrap();

    assert!(timed_out);
    assert!(started.elapsed() < Duration::from_millis(4500));

    let entries = scope.all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, LogLevel::Error);
    assert_eq!(entries[0].message, "operation(`press`) failed");
    assert_eq!(entries[0].exception_type.as_deref(), Some("TimeoutError"));
    assert_eq!(entries[0].dump_data.as_deref(), Some("{\"timeout\":3000}"));
}

#[test]
fn test_timeout_propagates_when_not_continuing() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();

    let err = scope
        .with_timeout(
            |token: CancellationToken| {
                while !token.is_cancelled() {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Ok(())
            },
            100,
            Some("wait"),
            false,
        )
        .unwrap_err();

    assert!(err.is_timeout());
    let fault = err.into_fault().unwrap();
    assert_eq!(fault.downcast_ref::<TimeoutError>().unwrap().millis, 100);
    assert_eq!(scope.all().unwrap().len(), 1);
}

#[test]
fn test_guarded_call_reraises_original_fault() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();

    let err = scope
        .guarded_call(
            || -> anyhow::Result<()> { Err(station_failure().into()) },
            Some("calibrate"),
            false,
        )
        .unwrap_err();

    let fault = err.into_fault().unwrap();
    assert!(fault.downcast_ref::<StationError>().is_some());

    let entries = scope.all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, LogLevel::Error);
    assert_eq!(entries[0].message, "operation(`calibrate`) failed");

    let snapshot: ExceptionSnapshot =
        serde_json::from_str(entries[0].exception_data.as_deref().unwrap()).unwrap();
    assert_eq!(snapshot.depth(), 3);
}

#[test]
fn test_guarded_call_continue_returns_none() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();

    let value = scope
        .guarded_call(
            || -> anyhow::Result<u32> { anyhow::bail!("counter missing") },
            None,
            true,
        )
        .unwrap();
    assert_eq!(value, None);

    let value = scope.guarded_call(|| Ok(5u32), None, true).unwrap();
    assert_eq!(value, Some(5));
    assert_eq!(scope.all().unwrap().len(), 1);
}

#[tokio::test]
async fn test_async_guarded_call() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();

    let err = with_timeout(
        DEFAULT_TIMEOUT,
        scope.guarded_call_async(
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err::<(), _>(anyhow::Error::new(station_failure()))
            },
            Some("upload"),
            false,
        ),
    )
    .await
    .unwrap_err();

    assert!(err.fault().unwrap().is::<StationError>());
    assert_eq!(scope.all().unwrap()[0].message, "operation(`upload`) failed");
}

#[tokio::test]
async fn test_async_timeout_cancels_token() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();
    let observed = Arc::new(AtomicBool::new(false));

    let token_seen = observed.clone();
    let timed_out = with_timeout(
        DEFAULT_TIMEOUT,
        scope.with_timeout_async(
            move |token: CancellationToken| {
                let watcher = token.clone();
                tokio::spawn(async move {
                    watcher.cancelled().await;
                    token_seen.store(true, Ordering::SeqCst);
                });
                async move {
                    token.cancelled().await;
                    Ok::<(), anyhow::Error>(())
                }
            },
            50,
            Some("drain"),
            true,
        ),
    )
    .await
    .unwrap();

    assert!(timed_out);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(observed.load(Ordering::SeqCst));

    let entries = scope.all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].dump_data.as_deref(), Some("{\"timeout\":50}"));
}

#[tokio::test]
async fn test_async_timeout_resurfaces_action_fault() {
    let test_ctx = TestContext::in_memory();
    let scope = test_ctx.context.begin_scope::<Assembly>();

    let err = scope
        .with_timeout_async(
            |_| async { Err::<(), _>(anyhow::Error::new(station_failure())) },
            1_000,
            Some("fetch"),
            false,
        )
        .await
        .unwrap_err();

    assert!(!err.is_timeout());
    assert!(err.fault().unwrap().is::<StationError>());
    assert_eq!(scope.all().unwrap().len(), 1);
}
