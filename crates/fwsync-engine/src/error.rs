//! Engine error types.
//!
//! Two kinds matter: read failures abort the invocation before any mutation
//! is attempted; mutation failures are collected behind the barrier and
//! surfaced together once every operation has finished.

use std::fmt;

use thiserror::Error;

use fwsync_core::CoreError;
use fwsync_provider::ProviderError;

/// Which side of the plan a failed operation belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// One failed create/delete call, tied to the target it was directed at.
#[derive(Debug)]
pub struct OperationFailure {
    /// Target name the operation was directed at.
    pub target: String,
    /// Human-readable description of the operation, e.g. `delete webapp-1-2-3-4`.
    pub operation: String,
    /// The provider error that failed it.
    pub error: ProviderError,
}

impl OperationFailure {
    pub fn new(
        target: impl Into<String>,
        kind: OperationKind,
        rule: impl Into<String>,
        error: ProviderError,
    ) -> Self {
        Self {
            target: target.into(),
            operation: format!("{kind} {}", rule.into()),
            error,
        }
    }

    /// A spawned operation task that never reported back (panicked or was
    /// aborted). Operation identity is lost with the task.
    pub(crate) fn from_join(error: tokio::task::JoinError) -> Self {
        Self {
            target: "unknown".to_string(),
            operation: "operation task".to_string(),
            error: ProviderError::transport(format!("operation task failed: {error}")),
        }
    }
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}: {}", self.operation, self.target, self.error)
    }
}

fn first_failure(failures: &[OperationFailure]) -> String {
    failures
        .first()
        .map(|failure| failure.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Errors produced by a reconciliation invocation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A read-side provider call failed; nothing was mutated.
    #[error("Read failed while {stage}: {source}")]
    Read {
        /// Which read failed.
        stage: &'static str,
        #[source]
        source: ProviderError,
    },

    /// A desired-side address could not be normalized; nothing was mutated.
    #[error("Desired set collection failed: {0}")]
    Collect(#[from] CoreError),

    /// One or more mutations failed. Every operation ran to a terminal state
    /// before this was reported; the full failure list is carried.
    #[error("{} of {attempted} operations failed; first: {}", .failures.len(), first_failure(.failures))]
    Apply {
        /// Total operations submitted across all targets.
        attempted: usize,
        /// Every per-operation failure.
        failures: Vec<OperationFailure>,
    },
}

impl EngineError {
    /// Creates a new `Read` error.
    #[must_use]
    pub fn read(stage: &'static str, source: ProviderError) -> Self {
        Self::Read { stage, source }
    }

    /// Returns `true` if the invocation aborted before any mutation.
    #[must_use]
    pub fn is_read_failure(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Collect(_))
    }
}
