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

use crate::types::v1alpha1::status::state::State;
use crate::types::v1alpha1::status::target::Target;
use k8s_openapi::api::apps::v1;

/// One replica-count update to issue against a workload.
pub struct ScaleAction {
    /// Snapshot copy of the workload, still carrying the resourceVersion
    /// it was read at.
    pub workload: v1::Deployment,
    pub replicas: i32,
}

/// Outcome of one decision pass: the updates to issue, the lifecycle state
/// to report, and the target set to persist.
pub struct Decision {
    pub actions: Vec<ScaleAction>,
    pub next_state: State,
    pub targets: Vec<Target>,
}

/// Compute the replica-count action per workload and the resulting state.
/// Pure; convergence is confirmed by the next snapshot, not in-pass.
pub fn decide(
    selected: &[&v1::Deployment],
    workloads: &[v1::Deployment],
    enable: bool,
    prior_targets: &[Target],
) -> Decision {
    if enable {
        decide_enable(selected, workloads, prior_targets)
    } else {
        decide_disable(workloads, prior_targets)
    }
}

fn decide_enable(
    selected: &[&v1::Deployment],
    workloads: &[v1::Deployment],
    prior_targets: &[Target],
) -> Decision {
    let mut actions = Vec::new();
    let mut targets = Vec::new();

    for workload in selected {
        let prior = prior_targets.iter().find(|t| t.matches(workload));
        let replicas = current_replicas(workload);

        if replicas > 0 {
            // keep an already-remembered count rather than overwriting it;
            // an external actor may have raised the workload mid-window
            targets.push(prior.cloned().unwrap_or_else(|| Target::of(workload, replicas)));
            actions.push(ScaleAction {
                workload: (*workload).clone(),
                replicas: 0,
            });
        } else if let Some(prior) = prior {
            targets.push(prior.clone());
        }
        // at zero without a record: suspended by something else, not ours
    }

    // a target that fell out of selection is still ours until restored
    for target in prior_targets {
        if selected.iter().any(|w| target.matches(w)) {
            continue;
        }

        let Some(workload) = workloads.iter().find(|w| target.matches(w)) else {
            continue;
        };

        if current_replicas(workload) != restore_count(target) {
            actions.push(ScaleAction {
                workload: workload.clone(),
                replicas: restore_count(target),
            });
            targets.push(target.clone());
        }
    }

    let next_state = if actions.is_empty() {
        State::Enabled
    } else {
        State::ScalingDown
    };

    Decision {
        actions,
        next_state,
        targets,
    }
}

fn decide_disable(workloads: &[v1::Deployment], prior_targets: &[Target]) -> Decision {
    let mut actions = Vec::new();
    let mut targets = Vec::new();

    for target in prior_targets {
        // gone from the cluster: nothing left to restore
        let Some(workload) = workloads.iter().find(|w| target.matches(w)) else {
            continue;
        };

        // dropped only once the remembered count is observed; any other
        // count, zero or externally nudged, still gets a restore
        if current_replicas(workload) != restore_count(target) {
            actions.push(ScaleAction {
                workload: workload.clone(),
                replicas: restore_count(target),
            });
            targets.push(target.clone());
        }
    }

    let next_state = if targets.is_empty() {
        State::Disabled
    } else {
        State::ScalingUp
    };

    Decision {
        actions,
        next_state,
        targets,
    }
}

fn current_replicas(workload: &v1::Deployment) -> i32 {
    workload
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(1)
}

/// Never restore to zero; that would silently leave the workload down.
fn restore_count(target: &Target) -> i32 {
    target.restore_replicas.max(1)
}
