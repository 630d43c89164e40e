//! Test utilities for the admission webhook

use crate::validator::{AdmissionValidator, SecretValidator};
use crds::constants::MULTI_CLUSTER_NAMESPACE;
use crds::{ManagedCluster, ManagedClusterSpec};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use resource_store::MockStore;
use std::sync::Arc;

/// Helper to create a test Secret
pub fn create_test_secret(name: &str, namespace: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Helper to create a test ManagedCluster referencing `prometheus_secret`
pub fn create_test_cluster(name: &str, prometheus_secret: &str) -> ManagedCluster {
    ManagedCluster {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(MULTI_CLUSTER_NAMESPACE.to_string()),
            ..Default::default()
        },
        spec: ManagedClusterSpec {
            description: Some(format!("managed cluster {}", name)),
            prometheus_secret: prometheus_secret.to_string(),
            service_account: None,
        },
    }
}

/// Validator over `secrets`
pub fn create_test_validator(secrets: &MockStore<Secret>) -> AdmissionValidator {
    AdmissionValidator::new(SecretValidator::new(Arc::new(secrets.clone())))
}
