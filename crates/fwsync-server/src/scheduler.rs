//! The periodic trigger.
//!
//! Fire-and-forget: each tick runs one reconciliation and logs the outcome.
//! Failures are not retried ahead of schedule - the next tick re-diffs
//! against live state and picks up whatever is left.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use fwsync_engine::Reconciler;

/// Spawns the periodic trigger task.
///
/// The first run happens one full interval after startup, not immediately,
/// so a deploy does not double-run alongside an operator-issued HTTP
/// trigger.
pub fn spawn(reconciler: Arc<Reconciler>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval's first tick completes immediately; skip it
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match reconciler.run().await {
                Ok(summary) => {
                    tracing::info!(
                        targets = summary.targets,
                        added = summary.rules_added,
                        removed = summary.rules_removed,
                        "scheduled reconciliation complete"
                    );
                }
                Err(err) => {
                    tracing::error!(error = %err, "scheduled reconciliation failed");
                }
            }
        }
    })
}
