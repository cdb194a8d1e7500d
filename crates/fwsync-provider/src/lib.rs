//! # fwsync-provider
//!
//! Cloud provider abstraction for fwsync.
//!
//! This crate defines the contract an authenticated cloud session must
//! implement for the reconciliation engine to run against it. It does not
//! contain any implementations - those are provided by separate crates
//! (`fwsync-provider-azure` for the real thing, `fwsync-provider-memory`
//! for tests and local development).
//!
//! ## Example
//!
//! ```ignore
//! use fwsync_provider::{CloudProvider, ProviderError};
//!
//! async fn rule_count(
//!     provider: &dyn CloudProvider,
//!     scope: &str,
//! ) -> Result<usize, ProviderError> {
//!     let mut total = 0;
//!     for target in provider.list_targets(scope).await? {
//!         total += provider.list_rules(&target).await?.len();
//!     }
//!     Ok(total)
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::ProviderError;
pub use traits::CloudProvider;
pub use types::ComputeEndpoint;

/// Type alias for a provider result.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Type alias for a shared provider trait object.
pub type DynProvider = std::sync::Arc<dyn CloudProvider>;
