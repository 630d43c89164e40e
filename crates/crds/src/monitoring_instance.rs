//! MonitoringInstance CRD
//!
//! The monitoring stack (Grafana, Prometheus, Elasticsearch, Kibana) managed
//! on behalf of a `Binding`. The platform that runs the stack assigns
//! persistent volume claim names after creation; those land in
//! `storage.pvcNames` and must survive every later update.
//!
//! Every field defaults to its empty value. An empty value in a desired spec
//! means "no preference", so all fields must be optional on the wire.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "monitoring.microscaler.io",
    version = "v1alpha1",
    kind = "MonitoringInstance",
    namespaced,
    printcolumn = r#"{"name":"URI","type":"string","jsonPath":".spec.uri"}"#
)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoringInstanceSpec {
    /// Base DNS name the instance endpoints are served under
    pub uri: String,

    /// Generate instance credentials automatically
    pub auto_secret: bool,

    /// Secret holding instance credentials
    pub secrets_name: String,

    /// Delete dependent resources together with the instance
    pub cascading_delete: bool,

    pub grafana: Grafana,

    pub prometheus: Prometheus,

    pub elasticsearch: Elasticsearch,

    pub kibana: Kibana,

    /// DNS name of the ingress the instance endpoints route through
    pub ingress_target_dns_name: String,

    /// Kubernetes service type used to expose the instance
    pub service_type: String,
}

/// Persistent storage request of a subcomponent
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Storage {
    /// Requested size (e.g., "50Gi"); empty means ephemeral storage
    pub size: String,

    /// Persistent volume claims assigned by the platform
    pub pvc_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Resources {
    /// Memory request (e.g., "48Mi")
    pub request_memory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Grafana {
    pub enabled: bool,
    pub storage: Storage,
    /// ConfigMap holding provisioned dashboards
    pub dashboards_config_map: String,
    pub resources: Resources,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Prometheus {
    pub enabled: bool,
    pub storage: Storage,
    pub resources: Resources,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Elasticsearch {
    pub enabled: bool,
    pub storage: Storage,
    pub ingest_node: ElasticsearchNode,
    pub master_node: ElasticsearchNode,
    pub data_node: ElasticsearchNode,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ElasticsearchNode {
    pub replicas: i32,
    pub resources: Resources,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Kibana {
    pub enabled: bool,
    pub resources: Resources,
}

impl MonitoringInstanceSpec {
    /// Copy every platform-assigned volume claim list from `existing`
    ///
    /// Claim names are never computed from a binding; the values already
    /// persisted on the cluster always win.
    pub fn preserve_storage_claims(&mut self, existing: &MonitoringInstanceSpec) {
        self.grafana.storage.pvc_names = existing.grafana.storage.pvc_names.clone();
        self.prometheus.storage.pvc_names = existing.prometheus.storage.pvc_names.clone();
        self.elasticsearch.storage.pvc_names = existing.elasticsearch.storage.pvc_names.clone();
    }
}
