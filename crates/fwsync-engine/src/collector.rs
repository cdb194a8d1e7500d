//! Desired-state collection.

use fwsync_core::{Address, DesiredSet};
use fwsync_provider::CloudProvider;

use crate::error::EngineError;

/// Gathers the deduplicated set of outbound addresses across every compute
/// endpoint in `scope`.
///
/// Each endpoint reports a comma-joined list; fragments are split, trimmed,
/// and normalized. Empty fragments (an endpoint with no outbound addresses
/// reports an empty string) are skipped; anything else that fails to parse is
/// a read-side failure and aborts the invocation - nothing has been mutated
/// at this point.
pub async fn collect_desired_set(
    provider: &dyn CloudProvider,
    scope: &str,
) -> Result<DesiredSet, EngineError> {
    let endpoints = provider
        .list_endpoints(scope)
        .await
        .map_err(|e| EngineError::read("listing compute endpoints", e))?;

    let mut desired = DesiredSet::new();
    for endpoint in &endpoints {
        for fragment in endpoint.outbound_addresses.split(',') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            desired.insert(Address::parse(fragment)?);
        }
    }

    tracing::debug!(
        scope,
        endpoints = endpoints.len(),
        addresses = desired.len(),
        "desired set collected"
    );
    Ok(desired)
}
