//! The cloud session contract consumed by the reconciliation engine.

use async_trait::async_trait;

use fwsync_core::{Address, FirewallRule, Target};

use crate::error::ProviderError;
use crate::types::ComputeEndpoint;

/// An authenticated cloud session.
///
/// All methods are remote calls that may fail with a provider-defined error;
/// none of them retry internally. Implementations must be thread-safe
/// (`Send + Sync`) - the engine shares one session across concurrently
/// spawned operations.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Lists the compute endpoints in a resource-group scope together with
    /// their raw, comma-joined outbound address lists.
    async fn list_endpoints(&self, scope: &str) -> Result<Vec<ComputeEndpoint>, ProviderError>;

    /// Lists the allow-list targets (database servers) in a scope.
    async fn list_targets(&self, scope: &str) -> Result<Vec<Target>, ProviderError>;

    /// Lists a target's current firewall rules.
    ///
    /// Rule names are unique within a target by provider contract; this is
    /// not enforced here, and callers fold duplicates last-one-wins.
    async fn list_rules(&self, target: &Target) -> Result<Vec<FirewallRule>, ProviderError>;

    /// Creates a single-address rule (`address..=address`) under `name`.
    ///
    /// If a rule with the same name already exists, the outcome is
    /// provider-defined (Azure upserts).
    async fn create_rule(
        &self,
        target: &Target,
        name: &str,
        address: &Address,
    ) -> Result<(), ProviderError>;

    /// Deletes a rule by name.
    async fn delete_rule(&self, target: &Target, name: &str) -> Result<(), ProviderError>;

    /// Returns the name of this provider for logging/debugging.
    fn provider_name(&self) -> &'static str;
}

// Ensure the trait is object-safe by using it as a trait object
#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that CloudProvider is object-safe
    fn _assert_provider_object_safe(_: &dyn CloudProvider) {}
}
