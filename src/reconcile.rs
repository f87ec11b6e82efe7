// Copyright 2025 MaintOps Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod inventory;
pub mod scale;
pub mod select;

use crate::context::Context;
use crate::types::v1alpha1::maintenance::MaintenanceMode;
use crate::types::v1alpha1::status::Status;
use crate::{context, types};
use kube::ResourceExt;
use kube::runtime::controller::Action;
use kube::runtime::events::EventType;
use snafu::{Snafu, ensure};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(transparent)]
    Context { source: context::Error },

    #[snafu(transparent)]
    Types { source: types::error::Error },

    #[snafu(display("inventory listing failed: {}", source))]
    InventoryUnavailable { source: context::Error },

    #[snafu(display("{} of {} workload updates failed", failed, total))]
    PartialApply { failed: usize, total: usize },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Context { source } if source.is_not_found())
    }
}

/// One reconciliation pass for one MaintenanceMode resource.
///
/// Reads the declared state, snapshots the inventory at the declared scope,
/// selects the workloads in scope, decides the replica-count actions, then
/// applies them best-effort and writes the resulting state and target set
/// back to status. Applied updates are never rolled back; a partial failure
/// surfaces as an error so the runtime requeues the pass.
pub async fn reconcile_maintenance(
    mode: Arc<MaintenanceMode>,
    ctx: Arc<Context>,
) -> Result<Action, Error> {
    let ns = mode.namespace()?;
    let name = mode.name();

    let latest = match ctx.get::<MaintenanceMode>(&name, &ns).await {
        Ok(mode) => mode,
        Err(e) if e.is_not_found() => {
            debug!("maintenance mode {} is gone, nothing to reconcile", name);
            return Ok(Action::await_change());
        }
        Err(e) => return Err(e.into()),
    };

    if latest.metadata.deletion_timestamp.is_some() {
        debug!(
            "maintenance mode {} is deleted, deletion_timestamp is {:?}",
            name, latest.metadata.deletion_timestamp
        );
        return Ok(Action::await_change());
    }

    // 1. Snapshot claims and workloads at the declared scope
    let inventory = inventory::snapshot(&ctx, &latest.spec.scope, &ns).await?;

    // 2. Select the workloads in scope, withholding those held by a peer
    let peers = ctx.list_all::<MaintenanceMode>().await?;
    let selected = select::select(&inventory, &latest.spec, &ns);
    let (selected, conflicts) = select::partition_conflicts(selected, &latest, &peers.items);

    for conflict in &conflicts {
        warn!(
            "workload {}/{} is already held by {}",
            conflict.namespace, conflict.name, conflict.claimed_by
        );
        // events are observability only; a broken Events API must not
        // abort the pass
        if let Err(e) = ctx
            .record(
                &latest,
                EventType::Warning,
                "TargetConflict",
                format!(
                    "workload {}/{} is already held by {}",
                    conflict.namespace, conflict.name, conflict.claimed_by
                )
                .as_str(),
            )
            .await
        {
            warn!("unable to record TargetConflict event: {}", e);
        }
    }

    // 3. Decide the replica-count actions and the next lifecycle state
    let prior_targets = latest
        .status
        .as_ref()
        .map(|status| status.targets.clone())
        .unwrap_or_default();
    let decision = scale::decide(&selected, &inventory.workloads, latest.spec.enable, &prior_targets);

    // 4. Apply the actions best-effort; one failed workload must not block
    //    the rest of the batch
    let total = decision.actions.len();
    let mut failed = 0usize;
    for action in decision.actions {
        let mut workload = action.workload;
        let workload_ns = ResourceExt::namespace(&workload).unwrap_or_default();
        let workload_name = workload.name_any();

        if let Some(spec) = workload.spec.as_mut() {
            spec.replicas = Some(action.replicas);
        }

        match ctx.update(&workload, &workload_ns).await {
            Ok(_) => {
                info!(
                    "scaled {}/{} to {} replicas",
                    workload_ns, workload_name, action.replicas
                );
                // the scaling is applied at this point; a failed event
                // publish must not keep it out of the status targets
                let reason = if action.replicas == 0 { "Suspend" } else { "Restore" };
                if let Err(e) = ctx
                    .record(
                        &latest,
                        EventType::Normal,
                        reason,
                        format!(
                            "scaled {}/{} to {} replicas",
                            workload_ns, workload_name, action.replicas
                        )
                        .as_str(),
                    )
                    .await
                {
                    warn!("unable to record {} event: {}", reason, e);
                }
            }
            Err(e) if e.is_not_found() => {
                // vanished mid-pass; the next snapshot drops it from targets
                debug!("workload {}/{} is gone, skipping", workload_ns, workload_name);
            }
            Err(e) => {
                warn!("unable to scale {}/{}: {}", workload_ns, workload_name, e);
                failed += 1;
            }
        }
    }

    // 5. Report state and targets; skipped when nothing changed so a
    //    converged pass issues no writes at all
    let status = Status {
        state: decision.next_state,
        targets: decision.targets,
        conflicts,
    };
    if latest.status.as_ref() != Some(&status) {
        ctx.update_status(&latest, status.clone()).await?;
    }

    ensure!(failed == 0, PartialApplySnafu { failed, total });

    if status.state.is_transitional() {
        // follow-up pass observes whether the cluster converged
        Ok(Action::requeue(Duration::from_secs(10)))
    } else {
        Ok(Action::await_change())
    }
}

pub fn error_policy(_object: Arc<MaintenanceMode>, error: &Error, _ctx: Arc<Context>) -> Action {
    error!("reconcile failed: {}", error);

    if error.is_not_found() {
        Action::await_change()
    } else {
        Action::requeue(Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16) -> context::Error {
        let source = kube::Error::Api(Box::new(kube::core::Status {
            code,
            ..Default::default()
        }));
        context::Error::Kube { source }
    }

    #[test]
    fn test_not_found_is_benign() {
        let error = Error::from(api_error(404));
        assert!(error.is_not_found());

        let error = Error::from(api_error(409));
        assert!(!error.is_not_found(), "conflicts are transient, not benign");
    }

    #[test]
    fn test_partial_apply_reports_counts() {
        let error = Error::PartialApply { failed: 2, total: 5 };
        assert_eq!(error.to_string(), "2 of 5 workload updates failed");
        assert!(!error.is_not_found());
    }
}
