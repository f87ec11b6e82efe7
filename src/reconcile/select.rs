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

use crate::reconcile::inventory::Inventory;
use crate::types::v1alpha1::maintenance::{MaintenanceMode, MaintenanceModeSpec, Scope};
use crate::types::v1alpha1::status::target::TargetConflict;
use k8s_openapi::api::apps::v1;
use k8s_openapi::api::core::v1 as corev1;
use kube::ResourceExt;
use std::collections::HashMap;

/// Which workloads fall under a maintenance window.
///
/// A workload is selected iff its namespace is consistent with the declared
/// scope and at least one claim it mounts is bound to a targeted storage
/// class. Workloads that mount no claims are never selected. Pure and
/// deterministic over the snapshot.
pub fn select<'a>(
    inventory: &'a Inventory,
    spec: &MaintenanceModeSpec,
    declaration_namespace: &str,
) -> Vec<&'a v1::Deployment> {
    let classes = claim_classes(&inventory.claims);

    inventory
        .workloads
        .iter()
        .filter(|workload| {
            let Some(namespace) = ResourceExt::namespace(*workload) else {
                return false;
            };

            if spec.scope == Scope::Namespace && namespace != declaration_namespace {
                return false;
            }

            mounted_claims(workload).any(|claim| {
                classes
                    .get(&(namespace.clone(), claim.to_owned()))
                    .is_some_and(|class| spec.selects_class(class.as_deref()))
            })
        })
        .collect()
}

/// Withhold selected workloads already held by a peer resource with a
/// contradictory intent. No precedence is applied beyond leaving the
/// workload to its current holder; the overlap is reported as a conflict.
pub fn partition_conflicts<'a>(
    selected: Vec<&'a v1::Deployment>,
    mode: &MaintenanceMode,
    peers: &[MaintenanceMode],
) -> (Vec<&'a v1::Deployment>, Vec<TargetConflict>) {
    let mut kept = Vec::with_capacity(selected.len());
    let mut conflicts = Vec::new();

    'workloads: for workload in selected {
        for peer in peers {
            if is_same_resource(peer, mode) || peer.spec.enable == mode.spec.enable {
                continue;
            }

            let holds = peer
                .status
                .as_ref()
                .is_some_and(|status| status.targets.iter().any(|t| t.matches(workload)));

            if holds {
                conflicts.push(TargetConflict {
                    namespace: ResourceExt::namespace(workload).unwrap_or_default(),
                    name: workload.name_any(),
                    claimed_by: format!(
                        "{}/{}",
                        ResourceExt::namespace(peer).unwrap_or_default(),
                        peer.name()
                    ),
                });
                continue 'workloads;
            }
        }

        kept.push(workload);
    }

    (kept, conflicts)
}

fn is_same_resource(a: &MaintenanceMode, b: &MaintenanceMode) -> bool {
    ResourceExt::namespace(a) == ResourceExt::namespace(b) && a.name_any() == b.name_any()
}

/// storage class per (namespace, claim name)
fn claim_classes(
    claims: &[corev1::PersistentVolumeClaim],
) -> HashMap<(String, String), Option<String>> {
    claims
        .iter()
        .map(|claim| {
            let key = (
                ResourceExt::namespace(claim).unwrap_or_default(),
                claim.name_any(),
            );
            let class = claim
                .spec
                .as_ref()
                .and_then(|spec| spec.storage_class_name.clone());
            (key, class)
        })
        .collect()
}

fn mounted_claims(workload: &v1::Deployment) -> impl Iterator<Item = &str> {
    workload
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .and_then(|pod| pod.volumes.as_deref())
        .unwrap_or_default()
        .iter()
        .filter_map(|volume| {
            volume
                .persistent_volume_claim
                .as_ref()
                .map(|source| source.claim_name.as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_claim, create_test_mode, create_test_workload};
    use crate::types::v1alpha1::status::Status;
    use crate::types::v1alpha1::status::target::Target;

    fn names(selected: &[&v1::Deployment]) -> Vec<String> {
        selected.iter().map(|w| w.name_any()).collect()
    }

    #[test]
    fn test_select_matching_storage_class() {
        let inventory = Inventory {
            claims: vec![
                create_test_claim("data-ssd", "default", Some("ssd")),
                create_test_claim("data-hdd", "default", Some("hdd")),
            ],
            workloads: vec![
                create_test_workload("db", "default", 3, &["data-ssd"]),
                create_test_workload("archive", "default", 2, &["data-hdd"]),
            ],
        };
        let mode = create_test_mode(true, Scope::Cluster, &["ssd"]);

        let selected = select(&inventory, &mode.spec, "default");

        assert_eq!(names(&selected), vec!["db"]);
    }

    #[test]
    fn test_select_empty_class_list_selects_all() {
        let inventory = Inventory {
            claims: vec![
                create_test_claim("data-ssd", "default", Some("ssd")),
                create_test_claim("data-unbound", "default", None),
            ],
            workloads: vec![
                create_test_workload("db", "default", 3, &["data-ssd"]),
                create_test_workload("legacy", "default", 1, &["data-unbound"]),
            ],
        };
        let mode = create_test_mode(true, Scope::Cluster, &[]);

        let selected = select(&inventory, &mode.spec, "default");

        assert_eq!(names(&selected), vec!["db", "legacy"]);
    }

    #[test]
    fn test_select_never_selects_claimless_workloads() {
        let inventory = Inventory {
            claims: vec![create_test_claim("data-ssd", "default", Some("ssd"))],
            workloads: vec![create_test_workload("stateless", "default", 5, &[])],
        };
        let mode = create_test_mode(true, Scope::Cluster, &[]);

        let selected = select(&inventory, &mode.spec, "default");

        assert!(selected.is_empty(), "wildcard must not select claimless workloads");
    }

    // Scenario: namespace scope, matching workload in another namespace
    #[test]
    fn test_select_namespace_scope_excludes_other_namespaces() {
        let inventory = Inventory {
            claims: vec![
                create_test_claim("data", "default", Some("ssd")),
                create_test_claim("data", "other", Some("ssd")),
            ],
            workloads: vec![
                create_test_workload("db", "default", 3, &["data"]),
                create_test_workload("db", "other", 3, &["data"]),
            ],
        };
        let mode = create_test_mode(true, Scope::Namespace, &["ssd"]);

        let selected = select(&inventory, &mode.spec, "default");

        assert_eq!(selected.len(), 1);
        assert_eq!(ResourceExt::namespace(selected[0]).as_deref(), Some("default"));
    }

    #[test]
    fn test_select_claim_resolved_in_workload_namespace() {
        // claim named "data" exists with the right class only in "other"
        let inventory = Inventory {
            claims: vec![create_test_claim("data", "other", Some("ssd"))],
            workloads: vec![create_test_workload("db", "default", 3, &["data"])],
        };
        let mode = create_test_mode(true, Scope::Cluster, &["ssd"]);

        let selected = select(&inventory, &mode.spec, "default");

        assert!(selected.is_empty(), "claim references must not cross namespaces");
    }

    #[test]
    fn test_select_dangling_claim_reference() {
        let inventory = Inventory {
            claims: vec![],
            workloads: vec![create_test_workload("db", "default", 3, &["missing"])],
        };
        let mode = create_test_mode(true, Scope::Cluster, &[]);

        let selected = select(&inventory, &mode.spec, "default");

        assert!(selected.is_empty());
    }

    #[test]
    fn test_partition_conflicts_withholds_held_workloads() {
        let inventory = Inventory {
            claims: vec![create_test_claim("data", "default", Some("ssd"))],
            workloads: vec![create_test_workload("db", "default", 3, &["data"])],
        };
        let mode = create_test_mode(true, Scope::Cluster, &["ssd"]);

        let mut peer = create_test_mode(false, Scope::Cluster, &["ssd"]);
        peer.metadata.name = Some("other-maintenance".to_string());
        peer.status = Some(Status {
            targets: vec![Target {
                namespace: "default".to_string(),
                name: "db".to_string(),
                restore_replicas: 3,
            }],
            ..Default::default()
        });

        let selected = select(&inventory, &mode.spec, "default");
        let (kept, conflicts) = partition_conflicts(selected, &mode, &[peer]);

        assert!(kept.is_empty());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].name, "db");
        assert_eq!(conflicts[0].claimed_by, "default/other-maintenance");
    }

    #[test]
    fn test_partition_conflicts_ignores_self_and_same_intent() {
        let inventory = Inventory {
            claims: vec![create_test_claim("data", "default", Some("ssd"))],
            workloads: vec![create_test_workload("db", "default", 3, &["data"])],
        };
        let mode = create_test_mode(true, Scope::Cluster, &["ssd"]);

        // same-intent peer holding the workload is not a conflict
        let mut peer = create_test_mode(true, Scope::Cluster, &["ssd"]);
        peer.metadata.name = Some("other-maintenance".to_string());
        peer.status = Some(Status {
            targets: vec![Target {
                namespace: "default".to_string(),
                name: "db".to_string(),
                restore_replicas: 3,
            }],
            ..Default::default()
        });

        let selected = select(&inventory, &mode.spec, "default");
        let (kept, conflicts) = partition_conflicts(selected, &mode, &[peer, mode.clone()]);

        assert_eq!(kept.len(), 1);
        assert!(conflicts.is_empty());
    }
}
