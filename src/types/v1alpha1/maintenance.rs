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

use crate::types;
use crate::types::error::NoNamespaceSnafu;
use k8s_openapi::schemars::JsonSchema;
use kube::{CustomResource, KubeSchema, ResourceExt};
use serde::{Deserialize, Serialize};
use snafu::OptionExt;
use strum::Display;

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, KubeSchema, Default)]
#[kube(
    group = "cluster.maintops.io",
    version = "v1alpha1",
    kind = "MaintenanceMode",
    namespaced,
    status = "crate::types::v1alpha1::status::Status",
    shortname = "mm",
    plural = "maintenancemodes",
    singular = "maintenancemode",
    printcolumn = r#"{"name":"Enable", "type":"boolean", "jsonPath":".spec.enable"}"#,
    printcolumn = r#"{"name":"Scope", "type":"string", "jsonPath":".spec.scope"}"#,
    printcolumn = r#"{"name":"State", "type":"string", "jsonPath":".status.state"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#,
    crates(serde_json = "k8s_openapi::serde_json")
)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceModeSpec {
    /// The desired maintenance state. When enabled, every Deployment that
    /// mounts a PersistentVolumeClaim bound to one of the targeted storage
    /// classes is scaled down to zero replicas.
    pub enable: bool,

    /// Breadth of effect. `cluster` (the default) covers every namespace;
    /// `namespace` restricts the effect to the namespace this resource
    /// lives in.
    #[serde(default)]
    pub scope: Scope,

    /// Storage classes under maintenance. An empty list selects all
    /// storage classes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[x_kube(validation = Rule::new("self.all(c, c != '')").message("storage class names must not be empty"))]
    pub storage_class_names: Vec<String>,
}

/// Breadth of effect of a maintenance window.
#[derive(Default, Deserialize, Serialize, Clone, Debug, JsonSchema, Display, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[schemars(rename_all = "lowercase")]
pub enum Scope {
    #[strum(to_string = "cluster")]
    #[default]
    Cluster,

    #[strum(to_string = "namespace")]
    Namespace,
}

impl MaintenanceMode {
    pub fn namespace(&self) -> Result<String, types::error::Error> {
        ResourceExt::namespace(self).context(NoNamespaceSnafu)
    }

    pub fn name(&self) -> String {
        ResourceExt::name_any(self)
    }
}

impl MaintenanceModeSpec {
    /// Whether a claim bound to `class` falls under this maintenance
    /// window. An empty `storageClassNames` list is a wildcard and also
    /// covers claims that carry no storage class at all.
    pub fn selects_class(&self, class: Option<&str>) -> bool {
        if self.storage_class_names.is_empty() {
            return true;
        }

        class.is_some_and(|c| self.storage_class_names.iter().any(|n| n == c))
    }
}
