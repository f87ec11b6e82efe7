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

pub mod state;
pub mod target;

use kube::KubeSchema;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub state: state::State,

    /// Workloads this resource suspended, with the replica count to
    /// restore them to. Only these workloads are ever scaled back up.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<target::Target>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<target::TargetConflict>,
}
