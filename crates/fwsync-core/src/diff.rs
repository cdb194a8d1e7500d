//! The diff engine: desired state vs actual state for one target.
//!
//! The desired set is authoritative. Any rule whose address is not desired is
//! removed, whether or not this system created it; softening this to "only
//! remove rules we created" is an explicit policy change, not a bug fix.

use std::collections::{BTreeMap, BTreeSet};

use crate::address::Address;

/// The deduplicated set of addresses that should be allowed.
///
/// A `BTreeSet` so that iteration order (and therefore plan order and log
/// output) is deterministic; order carries no meaning.
pub type DesiredSet = BTreeSet<Address>;

/// The add/remove delta computed for one target in one invocation.
///
/// Computed fresh on every run and never persisted. The two sides are
/// disjoint by construction: an address in `to_add` is absent from the actual
/// state, while every name in `to_remove` refers to an address present in the
/// actual state but not desired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Names of existing rules to delete.
    pub to_remove: Vec<String>,
    /// Addresses to create rules for, named via [`crate::rule::rule_name`].
    pub to_add: Vec<Address>,
}

impl ReconciliationPlan {
    /// True when the target is already converged.
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Total number of operations this plan will issue.
    pub fn operation_count(&self) -> usize {
        self.to_remove.len() + self.to_add.len()
    }
}

/// Compute the plan that makes `actual` match `desired`.
///
/// `actual` maps rule name to rule address as reported by the provider
/// (names are unique within a target by provider contract).
///
/// - `to_remove`: every rule whose address is non-empty and not a member of
///   the desired set. The decision is address-based, not name-based.
/// - `to_add`: every desired address not present among the actual rule
///   addresses, regardless of what name would reference it.
///
/// An empty desired set removes every rule; full lockout is a valid,
/// intentional outcome; guarding against it is the caller's responsibility.
pub fn compute_plan(desired: &DesiredSet, actual: &BTreeMap<String, String>) -> ReconciliationPlan {
    let to_remove = actual
        .iter()
        .filter(|(_, address)| !address.is_empty() && !desired.contains(address.as_str()))
        .map(|(name, _)| name.clone())
        .collect();

    let to_add = desired
        .iter()
        .filter(|address| !actual.values().any(|existing| existing == address.as_str()))
        .cloned()
        .collect();

    ReconciliationPlan { to_remove, to_add }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::rule_name;

    fn desired(addresses: &[&str]) -> DesiredSet {
        addresses
            .iter()
            .map(|a| Address::parse(a).unwrap())
            .collect()
    }

    fn actual(rules: &[(&str, &str)]) -> BTreeMap<String, String> {
        rules
            .iter()
            .map(|(name, addr)| (name.to_string(), addr.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_address_is_added() {
        let plan = compute_plan(
            &desired(&["1.2.3.4", "5.6.7.8"]),
            &actual(&[("r1", "1.2.3.4")]),
        );
        assert_eq!(plan.to_add, vec![Address::parse("5.6.7.8").unwrap()]);
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn test_undesired_address_is_removed() {
        let plan = compute_plan(
            &desired(&["1.2.3.4"]),
            &actual(&[("r1", "1.2.3.4"), ("r2", "9.9.9.9")]),
        );
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.to_remove, vec!["r2".to_string()]);
    }

    #[test]
    fn test_empty_desired_set_is_full_lockout() {
        let plan = compute_plan(&desired(&[]), &actual(&[("r1", "1.2.3.4")]));
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.to_remove, vec!["r1".to_string()]);
    }

    #[test]
    fn test_converged_target_yields_empty_plan() {
        let plan = compute_plan(
            &desired(&["1.2.3.4"]),
            &actual(&[("webapp-1-2-3-4", "1.2.3.4")]),
        );
        assert!(plan.is_empty());
        assert_eq!(plan.operation_count(), 0);
    }

    #[test]
    fn test_manually_named_rule_for_desired_address_is_kept() {
        // A rule created outside this system, with an arbitrary name, still
        // covers its address: nothing to add, nothing to remove.
        let plan = compute_plan(
            &desired(&["1.2.3.4"]),
            &actual(&[("AllowDevBox", "1.2.3.4")]),
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn test_removal_is_address_based_not_name_based() {
        // Even a rule carrying the derived-name convention is removed once
        // its address is no longer desired.
        let plan = compute_plan(
            &desired(&["1.2.3.4"]),
            &actual(&[("webapp-9-9-9-9", "9.9.9.9"), ("webapp-1-2-3-4", "1.2.3.4")]),
        );
        assert_eq!(plan.to_remove, vec!["webapp-9-9-9-9".to_string()]);
        assert!(plan.to_add.is_empty());
    }

    #[test]
    fn test_empty_address_rule_is_left_alone() {
        let plan = compute_plan(&desired(&[]), &actual(&[("broken", "")]));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_is_idempotent() {
        let d = desired(&["1.2.3.4", "5.6.7.8"]);
        let a = actual(&[("r1", "1.2.3.4"), ("r2", "9.9.9.9")]);
        assert_eq!(compute_plan(&d, &a), compute_plan(&d, &a));
    }

    #[test]
    fn test_add_and_remove_addresses_are_disjoint() {
        let d = desired(&["1.2.3.4", "5.6.7.8", "7.7.7.7"]);
        let a = actual(&[("r1", "1.2.3.4"), ("r2", "9.9.9.9"), ("r3", "8.8.8.8")]);
        let plan = compute_plan(&d, &a);

        let removed_addresses: Vec<&str> = plan
            .to_remove
            .iter()
            .map(|name| a[name].as_str())
            .collect();
        for added in &plan.to_add {
            assert!(!removed_addresses.contains(&added.as_str()));
        }
    }

    #[test]
    fn test_applying_plan_converges() {
        let d = desired(&["1.2.3.4", "5.6.7.8"]);
        let mut a = actual(&[("r1", "9.9.9.9"), ("AllowDevBox", "5.6.7.8")]);

        let plan = compute_plan(&d, &a);
        for name in &plan.to_remove {
            a.remove(name);
        }
        for address in &plan.to_add {
            a.insert(rule_name(address), address.as_str().to_string());
        }

        assert!(compute_plan(&d, &a).is_empty());
    }
}
