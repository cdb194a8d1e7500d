//! Allow-list entries and the targets that own them.

use serde::Serialize;

use crate::address::Address;

/// Prefix for rule names derived from an address. Rules carrying this prefix
/// were (almost certainly) created by this system, but the diff never relies
/// on that: the remove decision is made on the address value alone.
pub const RULE_NAME_PREFIX: &str = "webapp-";

/// Derive the deterministic rule name for an address.
///
/// `10.0.0.5` becomes `webapp-10-0-0-5`. The derivation is injective over
/// addresses, which makes re-applying an already-applied plan a no-op.
pub fn rule_name(address: &Address) -> String {
    format!("{RULE_NAME_PREFIX}{}", address.as_str().replace('.', "-"))
}

/// One entry in a target's current allow-list.
///
/// `address` is kept as the provider-reported string (trimmed), not re-parsed:
/// a malformed or non-canonical address never matches a desired address, so
/// the rule falls into the remove set and the canonical form is re-added on
/// the same run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRule {
    pub name: String,
    pub address: String,
}

impl FirewallRule {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into().trim().to_string(),
        }
    }
}

/// An addressable resource owning an independent allow-list.
///
/// Targets are reconciled independently and in any order; nothing in the
/// system coordinates across targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Provider-assigned identifier (for Azure, the full resource id).
    pub id: String,
    /// Human-readable server name, used in logs and error reports.
    pub name: String,
}

impl Target {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
