//! Plan execution: fire every operation, wait for all of them, then report.

use std::sync::Arc;

use tokio::task::JoinSet;

use fwsync_core::{ReconciliationPlan, Target, rule_name};
use fwsync_provider::{CloudProvider, DynProvider};

use crate::error::{EngineError, OperationFailure, OperationKind};

/// A target paired with the plan computed for it.
#[derive(Debug)]
pub struct TargetPlan {
    pub target: Target,
    pub plan: ReconciliationPlan,
}

/// Successful-operation counts after a full barrier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub added: usize,
    pub removed: usize,
}

/// Applies every plan across every target concurrently.
///
/// One task per delete and one per create is spawned into a single
/// [`JoinSet`] - the barrier spans all targets, not each one separately.
/// Removals and additions carry no ordering dependency: the diff guarantees
/// their rule identities are disjoint. Operations are independent; a failure
/// neither cancels nor blocks siblings, and nothing is retried here.
///
/// Returns once every operation has reached a terminal state. If any failed,
/// the error aggregates all of them; the successes still happened and the
/// next invocation's diff picks up the remainder.
pub async fn apply_plans(
    provider: &DynProvider,
    plans: Vec<TargetPlan>,
) -> Result<ApplyOutcome, EngineError> {
    let mut join_set = JoinSet::new();
    let mut attempted = 0usize;

    for TargetPlan { target, plan } in plans {
        let target = Arc::new(target);

        for name in plan.to_remove {
            let provider = Arc::clone(provider);
            let target = Arc::clone(&target);
            attempted += 1;
            join_set.spawn(async move {
                provider
                    .delete_rule(&target, &name)
                    .await
                    .map(|()| OperationKind::Delete)
                    .map_err(|error| {
                        OperationFailure::new(target.name.as_str(), OperationKind::Delete, name, error)
                    })
            });
        }

        for address in plan.to_add {
            let provider = Arc::clone(provider);
            let target = Arc::clone(&target);
            let name = rule_name(&address);
            attempted += 1;
            join_set.spawn(async move {
                provider
                    .create_rule(&target, &name, &address)
                    .await
                    .map(|()| OperationKind::Create)
                    .map_err(|error| {
                        OperationFailure::new(target.name.as_str(), OperationKind::Create, name, error)
                    })
            });
        }
    }

    // Full barrier: drain every task before inspecting failures.
    let mut outcome = ApplyOutcome::default();
    let mut failures = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok(OperationKind::Create)) => outcome.added += 1,
            Ok(Ok(OperationKind::Delete)) => outcome.removed += 1,
            Ok(Err(failure)) => failures.push(failure),
            Err(join_error) => failures.push(OperationFailure::from_join(join_error)),
        }
    }

    if failures.is_empty() {
        Ok(outcome)
    } else {
        Err(EngineError::Apply {
            attempted,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwsync_core::Address;
    use fwsync_provider_memory::InMemoryProvider;

    fn plan(to_remove: &[&str], to_add: &[&str]) -> ReconciliationPlan {
        ReconciliationPlan {
            to_remove: to_remove.iter().map(|s| s.to_string()).collect(),
            to_add: to_add.iter().map(|a| Address::parse(a).unwrap()).collect(),
        }
    }

    fn target_plan(name: &str, p: ReconciliationPlan) -> TargetPlan {
        TargetPlan {
            target: Target::new(name, name),
            plan: p,
        }
    }

    #[tokio::test]
    async fn test_applies_adds_and_removes() {
        let memory = InMemoryProvider::new()
            .with_target("sql-a")
            .with_rule("sql-a", "stale", "9.9.9.9");
        let provider: DynProvider = Arc::new(memory.clone());

        let outcome = apply_plans(
            &provider,
            vec![target_plan("sql-a", plan(&["stale"], &["1.2.3.4"]))],
        )
        .await
        .unwrap();

        assert_eq!(outcome, ApplyOutcome { added: 1, removed: 1 });
        let rules = memory.rules_of("sql-a").await;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules["webapp-1-2-3-4"], "1.2.3.4");
    }

    #[tokio::test]
    async fn test_empty_plans_are_a_no_op() {
        let provider: DynProvider = Arc::new(InMemoryProvider::new().with_target("sql-a"));
        let outcome = apply_plans(&provider, vec![target_plan("sql-a", plan(&[], &[]))])
            .await
            .unwrap();
        assert_eq!(outcome, ApplyOutcome::default());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_siblings() {
        let memory = InMemoryProvider::new()
            .with_target("sql-a")
            .with_rule("sql-a", "stale-1", "9.9.9.9")
            .with_rule("sql-a", "stale-2", "8.8.8.8")
            .with_failing_delete("sql-a", "stale-1");
        let provider: DynProvider = Arc::new(memory.clone());

        let err = apply_plans(
            &provider,
            vec![target_plan(
                "sql-a",
                plan(&["stale-1", "stale-2"], &["1.2.3.4"]),
            )],
        )
        .await
        .unwrap_err();

        match err {
            EngineError::Apply { attempted, failures } => {
                assert_eq!(attempted, 3);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].target, "sql-a");
            }
            other => panic!("expected Apply error, got {other}"),
        }

        // The sibling delete and the create both ran to completion.
        let rules = memory.rules_of("sql-a").await;
        assert!(rules.contains_key("stale-1"));
        assert!(!rules.contains_key("stale-2"));
        assert!(rules.contains_key("webapp-1-2-3-4"));
    }

    #[tokio::test]
    async fn test_failures_aggregate_across_targets() {
        // A failed delete on one target and a failed create on another both
        // end up in the same report.
        let provider: DynProvider = Arc::new(
            InMemoryProvider::new()
                .with_target("sql-a")
                .with_target("sql-b")
                .with_rule("sql-a", "stale-a", "9.9.9.9")
                .with_failing_delete("sql-a", "stale-a")
                .with_failing_create("sql-b", "webapp-1-2-3-4"),
        );

        let err = apply_plans(
            &provider,
            vec![
                target_plan("sql-a", plan(&["stale-a"], &[])),
                target_plan("sql-b", plan(&[], &["1.2.3.4"])),
            ],
        )
        .await
        .unwrap_err();

        match err {
            EngineError::Apply { failures, .. } => {
                let mut targets: Vec<String> =
                    failures.iter().map(|f| f.target.clone()).collect();
                targets.sort();
                assert_eq!(targets, vec!["sql-a", "sql-b"]);
            }
            other => panic!("expected Apply error, got {other}"),
        }
    }
}
