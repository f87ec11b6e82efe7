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

use k8s_openapi::api::apps::v1;
use kube::{KubeSchema, ResourceExt};
use serde::{Deserialize, Serialize};

/// A workload under this resource's suspension responsibility.
///
/// The replica count is recorded at suspension time and persisted here,
/// never recomputed at restore time. An external actor may change the
/// workload while it is suspended; restore fidelity is to the count that
/// was running before maintenance began.
#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub namespace: String,

    pub name: String,

    pub restore_replicas: i32,
}

impl Target {
    pub fn of(workload: &v1::Deployment, restore_replicas: i32) -> Self {
        Self {
            namespace: ResourceExt::namespace(workload).unwrap_or_default(),
            name: workload.name_any(),
            restore_replicas,
        }
    }

    pub fn matches(&self, workload: &v1::Deployment) -> bool {
        ResourceExt::namespace(workload).as_deref() == Some(self.namespace.as_str())
            && workload.name_any() == self.name
    }
}

/// Diagnostic for a workload claimed by another MaintenanceMode resource
/// with a contradictory intent. The workload is left to the resource that
/// already holds it; this record surfaces the overlap to the operator.
#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetConflict {
    pub namespace: String,

    pub name: String,

    /// `namespace/name` of the MaintenanceMode resource holding the workload.
    pub claimed_by: String,
}
