//! Azure Resource Manager implementation of the fwsync cloud provider.
//!
//! Talks to the ARM REST API directly over `reqwest`: Web Apps supply the
//! outbound address lists, SQL servers are the targets, and their
//! `firewallRules` sub-resources are the allow-list entries. Authentication
//! is an OAuth2 client-credentials grant against the tenant's token endpoint,
//! cached until shortly before expiry.
//!
//! There is deliberately no retry or backoff in here: a failed call surfaces
//! as a `ProviderError` and the engine's next invocation self-heals.

mod auth;
mod provider;

pub use auth::AzureCredentials;
pub use provider::AzureProvider;
