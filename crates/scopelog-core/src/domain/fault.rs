//! Fault snapshots and the fault types raised by the engine itself

use std::any::Any;
use std::backtrace::BacktraceStatus;
use std::collections::BTreeMap;
use std::error::Error;

use serde::{Deserialize, Serialize};

use super::{short_name, short_type_name};

/// Upper bound on snapshot depth, in case a chain never terminates.
const MAX_DEPTH: usize = 64;

/// Serializable tree describing a fault and its chain of causes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionSnapshot {
    pub type_name: String,
    pub message: String,
    pub stack_trace: Option<String>,
    /// Originating component (crate name), when known.
    pub source: Option<String>,
    pub data: BTreeMap<String, String>,
    pub inner: Option<Box<ExceptionSnapshot>>,
}

impl ExceptionSnapshot {
    /// Snapshot an error whose concrete type is known statically.
    pub fn from_typed<E: Error + 'static>(error: &E) -> Self {
        let mut snapshot = Self::from_error(error);
        snapshot.type_name = short_type_name::<E>().to_string();
        snapshot.source = crate_of(std::any::type_name::<E>());
        snapshot
    }

    /// Snapshot an `anyhow` error, including its backtrace when one was captured.
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        let root: &(dyn Error + 'static) = error.as_ref();
        let mut snapshot = Self::from_error(root);

        let backtrace = error.backtrace();
        if backtrace.status() == BacktraceStatus::Captured {
            snapshot.stack_trace = Some(backtrace.to_string());
        }
        snapshot
    }

    /// Walk `error` and its `source()` chain into a snapshot tree.
    ///
    /// Cycles are cut at the first revisited error object. Identity is the
    /// whole wide pointer: a wrapper whose only field is its cause shares
    /// that cause's address but not its vtable.
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut visited: Vec<*const (dyn Error + 'static)> = Vec::new();
        let mut nodes = Vec::new();
        let mut current = Some(error);

        while let Some(err) = current {
            let ptr: *const (dyn Error + 'static) = err;
            if nodes.len() >= MAX_DEPTH || visited.iter().any(|seen| std::ptr::eq(*seen, ptr)) {
                break;
            }
            visited.push(ptr);
            nodes.push(Self::node(err));
            current = err.source();
        }

        let mut inner: Option<Box<ExceptionSnapshot>> = None;
        while let Some(mut node) = nodes.pop() {
            node.inner = inner;
            inner = Some(Box::new(node));
        }

        match inner {
            Some(root) => *root,
            None => Self::node(error),
        }
    }

    fn node(err: &(dyn Error + 'static)) -> Self {
        let (type_name, source) = erased_type_name(err);
        let mut data = BTreeMap::new();
        data.insert("debug".to_string(), format!("{:?}", err));

        Self {
            type_name,
            message: err.to_string(),
            stack_trace: None,
            source,
            data,
            inner: None,
        }
    }

    /// Number of nodes from this one down to the innermost cause.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Iterate root-to-leaf.
    pub fn chain(&self) -> impl Iterator<Item = &ExceptionSnapshot> {
        std::iter::successors(Some(self), |s| s.inner.as_deref())
    }
}

/// Recover a type name for an erased error.
///
/// Known types are identified by downcasting; anything else falls back to
/// the leading identifier of its `Debug` rendering.
fn erased_type_name(err: &(dyn Error + 'static)) -> (String, Option<String>) {
    macro_rules! known {
        ($($ty:ty),* $(,)?) => {
            $(
                if err.is::<$ty>() {
                    return (
                        short_type_name::<$ty>().to_string(),
                        crate_of(std::any::type_name::<$ty>()),
                    );
                }
            )*
        };
    }

    known!(
        Panicked,
        TimeoutError,
        std::io::Error,
        std::num::ParseIntError,
        std::num::ParseFloatError,
        std::str::Utf8Error,
        std::string::FromUtf8Error,
        std::fmt::Error,
        serde_json::Error,
    );

    let rendered = format!("{:?}", err);
    let ident: String = rendered
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    let name = short_name(&ident);
    if name.is_empty() {
        ("Error".to_string(), None)
    } else {
        (name.to_string(), None)
    }
}

fn crate_of(type_path: &str) -> Option<String> {
    type_path
        .split("::")
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// A panic caught while running guarded code.
#[derive(Debug, Clone, thiserror::Error)]
#[error("panicked: {message}")]
pub struct Panicked {
    pub message: String,
}

impl Panicked {
    /// Extract the panic message from a `catch_unwind` payload.
    pub fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        Self { message }
    }
}

/// Raised by the engine when a guarded action misses its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation did not complete within {millis}ms")]
pub struct TimeoutError {
    pub millis: u64,
}
