//  Copyright 2025 MaintOps Contributors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//      http:www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use k8s_openapi::api::apps::v1;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

use crate::types::v1alpha1::maintenance::{MaintenanceMode, MaintenanceModeSpec, Scope};

// Helper functions to build test objects (available to submodule tests via crate::tests)

pub fn create_test_mode(enable: bool, scope: Scope, storage_class_names: &[&str]) -> MaintenanceMode {
    MaintenanceMode {
        metadata: metav1::ObjectMeta {
            name: Some("test-maintenance".to_string()),
            namespace: Some("default".to_string()),
            uid: Some("test-uid-123".to_string()),
            ..Default::default()
        },
        spec: MaintenanceModeSpec {
            enable,
            scope,
            storage_class_names: storage_class_names.iter().map(|s| s.to_string()).collect(),
        },
        status: None,
    }
}

pub fn create_test_workload(
    name: &str,
    namespace: &str,
    replicas: i32,
    claim_names: &[&str],
) -> v1::Deployment {
    let volumes = if claim_names.is_empty() {
        None
    } else {
        Some(
            claim_names
                .iter()
                .map(|claim| corev1::Volume {
                    name: (*claim).to_string(),
                    persistent_volume_claim: Some(corev1::PersistentVolumeClaimVolumeSource {
                        claim_name: (*claim).to_string(),
                        read_only: None,
                    }),
                    ..Default::default()
                })
                .collect(),
        )
    };

    v1::Deployment {
        metadata: metav1::ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(v1::DeploymentSpec {
            replicas: Some(replicas),
            selector: metav1::LabelSelector::default(),
            template: corev1::PodTemplateSpec {
                metadata: None,
                spec: Some(corev1::PodSpec {
                    containers: vec![],
                    volumes,
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    }
}

pub fn create_test_claim(
    name: &str,
    namespace: &str,
    storage_class: Option<&str>,
) -> corev1::PersistentVolumeClaim {
    corev1::PersistentVolumeClaim {
        metadata: metav1::ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(corev1::PersistentVolumeClaimSpec {
            storage_class_name: storage_class.map(|s| s.to_string()),
            ..Default::default()
        }),
        status: None,
    }
}
