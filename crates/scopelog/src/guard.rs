//! Guarded execution: run an action, log whatever goes wrong, then either
//! swallow the fault or hand it back to the caller.
//!
//! ```text
//! guarded_call(action)
//!   ├─ Ok(v)            ─────────────────────────────► Ok(Some(v))
//!   ├─ Err(fault)       ─ dump_anyhow(Error) ─┬─ continue ─► Ok(None)
//!   │                                         └─ else ─────► Err(Faulted)
//!   └─ panic(payload)   ─ dump(Panicked)  ────┬─ continue ─► Ok(None)
//!                                             └─ else ─────► resume_unwind
//! ```
//!
//! The timed variants always report panics as a [`Panicked`] fault, since
//! the action may have run on another thread.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use futures::FutureExt;
use scopelog_core::{LogLevel, Panicked, TimeoutError};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{ScopeError, ScopeResult};
use crate::scope::LoggerScope;

/// Operation name used when the caller gives none.
pub const DEFAULT_OPERATION: &str = "unnamed";

/// Name of the worker thread that runs a deadline-bound action.
const TIMEOUT_THREAD_NAME: &str = "scopelog-timeout";

fn failure_message(operation: &str) -> String {
    format!("operation(`{}`) failed", operation)
}

fn panic_fault(payload: &(dyn std::any::Any + Send)) -> anyhow::Error {
    anyhow::Error::new(Panicked::from_payload(payload))
}

impl LoggerScope {
    /// Run `action`, logging a failure as an Error-level fault record.
    ///
    /// Returns `Ok(Some(value))` on success. On failure the fault is logged
    /// exactly once; with `continue_on_error` the result is `Ok(None)`,
    /// otherwise the original fault comes back inside
    /// [`ScopeError::Faulted`]. A panic is logged and then either swallowed
    /// or resumed.
    pub fn guarded_call<T, F>(
        &self,
        action: F,
        operation: Option<&str>,
        continue_on_error: bool,
    ) -> ScopeResult<Option<T>>
    where
        F: FnOnce() -> anyhow::Result<T>,
    {
        let operation = operation.unwrap_or(DEFAULT_OPERATION);

        match panic::catch_unwind(AssertUnwindSafe(action)) {
            Ok(Ok(value)) => Ok(Some(value)),
            Ok(Err(fault)) => self
                .report(fault, operation, None, continue_on_error)
                .map(|_| None),
            Err(payload) => {
                self.dump_anyhow(
                    &panic_fault(payload.as_ref()),
                    LogLevel::Error,
                    Some(&failure_message(operation)),
                    None,
                )?;
                if continue_on_error {
                    Ok(None)
                } else {
                    panic::resume_unwind(payload)
                }
            }
        }
    }

    /// Async counterpart of [`guarded_call`](Self::guarded_call).
    pub async fn guarded_call_async<T, Fut>(
        &self,
        action: Fut,
        operation: Option<&str>,
        continue_on_error: bool,
    ) -> ScopeResult<Option<T>>
    where
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let operation = operation.unwrap_or(DEFAULT_OPERATION);

        match AssertUnwindSafe(action).catch_unwind().await {
            Ok(Ok(value)) => Ok(Some(value)),
            Ok(Err(fault)) => self
                .report(fault, operation, None, continue_on_error)
                .map(|_| None),
            Err(payload) => {
                self.dump_anyhow(
                    &panic_fault(payload.as_ref()),
                    LogLevel::Error,
                    Some(&failure_message(operation)),
                    None,
                )?;
                if continue_on_error {
                    Ok(None)
                } else {
                    panic::resume_unwind(payload)
                }
            }
        }
    }

    /// Run `action` on a worker thread and wait at most `millis` for it.
    ///
    /// Returns `Ok(false)` when the action finished in time. On a deadline
    /// miss the token passed to the action is cancelled and a
    /// [`TimeoutError`] is logged; a fault of the action itself is logged
    /// instead. Either record carries `{"timeout": millis}` as extra
    /// context. With `continue_on_error` the result is `Ok(true)` for a
    /// timeout and `Ok(false)` for any other fault; otherwise the fault is
    /// returned in [`ScopeError::Faulted`].
    ///
    /// An action that never looks at its token keeps running after the
    /// deadline. The thread is detached, not killed.
    pub fn with_timeout<F>(
        &self,
        action: F,
        millis: u64,
        operation: Option<&str>,
        continue_on_error: bool,
    ) -> ScopeResult<bool>
    where
        F: FnOnce(CancellationToken) -> anyhow::Result<()> + Send + 'static,
    {
        let operation = operation.unwrap_or(DEFAULT_OPERATION);
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::channel();

        let worker_token = token.clone();
        std::thread::Builder::new()
            .name(TIMEOUT_THREAD_NAME.to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| action(worker_token)))
                    .unwrap_or_else(|payload| Err(panic_fault(payload.as_ref())));
                // The receiver is gone once the deadline passed.
                let _ = tx.send(outcome);
            })?;

        let outcome = match rx.recv_timeout(Duration::from_millis(millis)) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                token.cancel();
                warn!(
                    "Operation {} in scope {} exceeded {}ms",
                    operation,
                    self.name(),
                    millis
                );
                Err(anyhow::Error::new(TimeoutError { millis }))
            }
            Err(RecvTimeoutError::Disconnected) => Err(anyhow::anyhow!(
                "worker for operation {} exited without a result",
                operation
            )),
        };

        self.settle_timed(outcome, operation, millis, continue_on_error)
    }

    /// Async counterpart of [`with_timeout`](Self::with_timeout).
    ///
    /// The action future is raced against a timer. When the timer wins the
    /// token is cancelled and the action future is dropped; tasks it spawned
    /// elsewhere only stop if they observe the token.
    pub async fn with_timeout_async<F, Fut>(
        &self,
        action: F,
        millis: u64,
        operation: Option<&str>,
        continue_on_error: bool,
    ) -> ScopeResult<bool>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let operation = operation.unwrap_or(DEFAULT_OPERATION);
        let token = CancellationToken::new();
        let action = AssertUnwindSafe(action(token.clone())).catch_unwind();

        let outcome = tokio::select! {
            result = action => {
                result.unwrap_or_else(|payload| Err(panic_fault(payload.as_ref())))
            }
            _ = tokio::time::sleep(Duration::from_millis(millis)) => {
                token.cancel();
                warn!(
                    "Async operation {} in scope {} exceeded {}ms",
                    operation,
                    self.name(),
                    millis
                );
                Err(anyhow::Error::new(TimeoutError { millis }))
            }
        };

        self.settle_timed(outcome, operation, millis, continue_on_error)
    }

    fn settle_timed(
        &self,
        outcome: anyhow::Result<()>,
        operation: &str,
        millis: u64,
        continue_on_error: bool,
    ) -> ScopeResult<bool> {
        match outcome {
            Ok(()) => Ok(false),
            Err(fault) => {
                let timed_out = fault.is::<TimeoutError>();
                self.report(
                    fault,
                    operation,
                    Some(json!({ "timeout": millis })),
                    continue_on_error,
                )?;
                Ok(timed_out)
            }
        }
    }

    /// Log `fault`, then swallow it or return it as `Faulted`.
    fn report(
        &self,
        fault: anyhow::Error,
        operation: &str,
        extra: Option<serde_json::Value>,
        continue_on_error: bool,
    ) -> ScopeResult<()> {
        self.dump_anyhow(
            &fault,
            LogLevel::Error,
            Some(&failure_message(operation)),
            extra,
        )?;

        if continue_on_error {
            Ok(())
        } else {
            Err(ScopeError::Faulted {
                operation: operation.to_string(),
                fault,
            })
        }
    }
}
