//! # fwsync-engine
//!
//! The reconciliation engine: collect the desired address set, read each
//! target's actual rules, compute per-target plans, and apply every plan
//! concurrently behind a single barrier.
//!
//! The engine is stateless between invocations. Partial application under
//! concurrent failure is an accepted outcome, not an error kind: the next
//! invocation re-diffs against live state and proposes the remaining delta.
//!
//! ## Example
//!
//! ```ignore
//! use fwsync_engine::Reconciler;
//!
//! let reconciler = Reconciler::new(provider, "my-resource-group");
//! let summary = reconciler.run().await?;
//! tracing::info!(added = summary.rules_added, removed = summary.rules_removed, "done");
//! ```

pub mod collector;
pub mod error;
pub mod executor;
pub mod reconciler;

pub use collector::collect_desired_set;
pub use error::{EngineError, OperationFailure, OperationKind};
pub use executor::{ApplyOutcome, TargetPlan, apply_plans};
pub use reconciler::{ReconcileSummary, Reconciler};

/// Type alias for an engine result.
pub type EngineResult<T> = Result<T, EngineError>;
