//! Errors surfaced by scopes

use scopelog_core::TimeoutError;

/// Result type for scope operations
pub type ScopeResult<T> = Result<T, ScopeError>;

#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    /// The caller used the API incorrectly. Never logged, never swallowed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to serialize log payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store could not persist or read records.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// A guarded action failed (already logged) and the caller asked for
    /// the fault to be propagated.
    #[error("operation `{operation}` failed: {fault}")]
    Faulted {
        operation: String,
        fault: anyhow::Error,
    },
}

impl ScopeError {
    /// The original fault of a `Faulted` error.
    pub fn fault(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Faulted { fault, .. } => Some(fault),
            _ => None,
        }
    }

    pub fn into_fault(self) -> Option<anyhow::Error> {
        match self {
            Self::Faulted { fault, .. } => Some(fault),
            _ => None,
        }
    }

    /// Whether this error is a propagated deadline miss.
    pub fn is_timeout(&self) -> bool {
        self.fault().is_some_and(|f| f.is::<TimeoutError>())
    }
}
