//! The reconciliation orchestrator.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

use fwsync_core::compute_plan;
use fwsync_provider::{CloudProvider, DynProvider};

use crate::collector::collect_desired_set;
use crate::error::EngineError;
use crate::executor::{TargetPlan, apply_plans};

/// What a successful invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Targets reconciled this invocation.
    pub targets: usize,
    /// Desired addresses observed.
    pub desired_addresses: usize,
    /// Rules created.
    pub rules_added: usize,
    /// Rules deleted.
    pub rules_removed: usize,
}

/// Wires collector, diff engine and executor together for one scope.
///
/// Holds no state between runs; every invocation re-reads live state. Safe to
/// share and to invoke from both the HTTP trigger and the timer.
pub struct Reconciler {
    provider: DynProvider,
    scope: String,
}

impl Reconciler {
    pub fn new(provider: DynProvider, scope: impl Into<String>) -> Self {
        Self {
            provider,
            scope: scope.into(),
        }
    }

    /// The resource-group scope this reconciler operates on.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Runs one reconciliation invocation.
    ///
    /// Sequence: collect the desired set once (shared across targets) →
    /// enumerate targets → read every target's rules and compute its plan →
    /// apply all plans behind one barrier. Every read completes before the
    /// first mutation is attempted, so a read-side failure aborts the
    /// invocation with nothing changed. Mutation failures surface after the
    /// barrier as an aggregated [`EngineError::Apply`].
    pub async fn run(&self) -> Result<ReconcileSummary, EngineError> {
        let started = Instant::now();
        tracing::info!(scope = %self.scope, "reconciliation starting");

        let desired = collect_desired_set(self.provider.as_ref(), &self.scope).await?;

        let targets = self
            .provider
            .list_targets(&self.scope)
            .await
            .map_err(|e| EngineError::read("enumerating targets", e))?;

        let mut plans = Vec::with_capacity(targets.len());
        for target in targets {
            let rules = self
                .provider
                .list_rules(&target)
                .await
                .map_err(|e| EngineError::read("listing rules", e))?;

            // Fold into name -> address; last-one-wins on duplicate names,
            // which are provider-defined and not enforced here.
            let actual: BTreeMap<String, String> = rules
                .into_iter()
                .map(|rule| (rule.name, rule.address))
                .collect();

            let plan = compute_plan(&desired, &actual);
            tracing::debug!(
                target = %target.name,
                to_add = plan.to_add.len(),
                to_remove = plan.to_remove.len(),
                "plan computed"
            );
            plans.push(TargetPlan { target, plan });
        }

        let target_count = plans.len();
        let outcome = apply_plans(&self.provider, plans).await?;

        let summary = ReconcileSummary {
            targets: target_count,
            desired_addresses: desired.len(),
            rules_added: outcome.added,
            rules_removed: outcome.removed,
        };
        tracing::info!(
            scope = %self.scope,
            targets = summary.targets,
            added = summary.rules_added,
            removed = summary.rules_removed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reconciliation complete"
        );
        Ok(summary)
    }
}
