//! In-memory cloud provider for fwsync.
//!
//! This crate provides an in-memory implementation of the `CloudProvider`
//! trait from `fwsync-provider`, for engine tests and local development.
//! Mutations are applied to the in-memory state, so convergence can be
//! asserted by reconciling twice. Individual operations can be made to fail
//! to exercise the engine's partial-failure paths.
//!
//! # Example
//!
//! ```ignore
//! use fwsync_provider_memory::InMemoryProvider;
//!
//! let provider = InMemoryProvider::new()
//!     .with_endpoint("web-1", "1.2.3.4,5.6.7.8")
//!     .with_target("sql-a")
//!     .with_rule("sql-a", "stale", "9.9.9.9");
//! ```

mod provider;

pub use provider::InMemoryProvider;

// Re-export the CloudProvider trait for convenience
pub use fwsync_provider::{CloudProvider, ProviderError};
