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

use crate::context::Context;
use crate::reconcile::{Error, InventoryUnavailableSnafu};
use crate::types::v1alpha1::maintenance::Scope;
use k8s_openapi::api::apps::v1;
use k8s_openapi::api::core::v1 as corev1;
use snafu::futures::TryFutureExt;

/// Point-in-time view of the claims and workloads visible at a scope.
/// Read-only; consistency is whatever the list calls return.
pub struct Inventory {
    pub claims: Vec<corev1::PersistentVolumeClaim>,
    pub workloads: Vec<v1::Deployment>,
}

pub async fn snapshot(ctx: &Context, scope: &Scope, namespace: &str) -> Result<Inventory, Error> {
    let (claims, workloads) = match scope {
        Scope::Namespace => (
            ctx.list::<corev1::PersistentVolumeClaim>(namespace)
                .context(InventoryUnavailableSnafu)
                .await?,
            ctx.list::<v1::Deployment>(namespace)
                .context(InventoryUnavailableSnafu)
                .await?,
        ),
        Scope::Cluster => (
            ctx.list_all::<corev1::PersistentVolumeClaim>()
                .context(InventoryUnavailableSnafu)
                .await?,
            ctx.list_all::<v1::Deployment>()
                .context(InventoryUnavailableSnafu)
                .await?,
        ),
    };

    Ok(Inventory {
        claims: claims.items,
        workloads: workloads.items,
    })
}
