//! ManagedCluster CRD
//!
//! Registers a remote cluster whose metrics are scraped by the central
//! Prometheus. The scrape credentials live in a secret in the
//! multi-cluster namespace; the admission webhook refuses a
//! `ManagedCluster` whose secret is missing.

use crate::constants::MULTI_CLUSTER_NAMESPACE;
use crate::references::SecretReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "monitoring.microscaler.io",
    version = "v1alpha1",
    kind = "ManagedCluster",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterSpec {
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Name of the secret in the multi-cluster namespace holding Prometheus scrape credentials
    #[serde(default)]
    pub prometheus_secret: String,

    /// Service account used by the managed cluster agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

impl ManagedCluster {
    /// Reference to the Prometheus secret this cluster needs
    ///
    /// The secret always lives in the multi-cluster namespace, regardless
    /// of the namespace of the `ManagedCluster` itself.
    pub fn prometheus_secret_ref(&self) -> SecretReference {
        SecretReference::new(self.spec.prometheus_secret.clone(), MULTI_CLUSTER_NAMESPACE)
    }
}
