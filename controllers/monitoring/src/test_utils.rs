//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crate::reconciler::Reconciler;
use crate::spec_builder::{DefaultSpecBuilder, InstanceSettings, NodeSettings, SpecBuilder};
use crds::constants::SYSTEM_NAMESPACE;
use crds::{Binding, BindingSpec, MonitoringInstance, MonitoringInstanceSpec, WorkloadReference};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use resource_store::MockStore;
use std::sync::Arc;

/// Settings with storage enabled and a few sizes and requests filled in
pub fn test_settings() -> InstanceSettings {
    InstanceSettings {
        platform_uri: "example.com".to_string(),
        storage_enabled: true,
        grafana_storage_size: "10Gi".to_string(),
        prometheus_storage_size: "50Gi".to_string(),
        elasticsearch_storage_size: String::new(),
        grafana_request_memory: String::new(),
        prometheus_request_memory: "128Mi".to_string(),
        kibana_request_memory: String::new(),
        es_ingest_node: NodeSettings::default(),
        es_master_node: NodeSettings {
            replicas: 1,
            request_memory: String::new(),
        },
        es_data_node: NodeSettings {
            replicas: 2,
            request_memory: "1Gi".to_string(),
        },
    }
}

/// Helper to create test Binding CRD
pub fn create_test_binding(name: &str, namespace: &str) -> Binding {
    Binding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: BindingSpec {
            description: Some(format!("monitoring for {}", name)),
            workloads: vec![WorkloadReference::with_namespace("apps", "Deployment", name, namespace)],
        },
        status: None,
    }
}

/// Helper to create a MonitoringInstance labelled for the Binding `apps/<binding>`
pub fn create_test_instance(
    name: &str,
    namespace: &str,
    binding: &str,
    spec: MonitoringInstanceSpec,
) -> MonitoringInstance {
    MonitoringInstance {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(Reconciler::instance_labels(binding, "apps")),
            ..Default::default()
        },
        spec,
    }
}

/// Spec the default builder produces for `binding` with [`test_settings`]
pub fn built_spec(binding: &str) -> MonitoringInstanceSpec {
    DefaultSpecBuilder::new(test_settings())
        .build(&create_test_binding(binding, "apps"))
        .unwrap()
}

/// Reconciler over `store` using the default builder and [`test_settings`]
pub fn create_test_reconciler(store: &MockStore<MonitoringInstance>) -> Reconciler {
    Reconciler::new(
        Arc::new(store.clone()),
        Box::new(DefaultSpecBuilder::new(test_settings())),
    )
}

/// Key of an instance in the system namespace
pub fn system_instance(store: &MockStore<MonitoringInstance>, name: &str) -> Option<MonitoringInstance> {
    store.object(SYSTEM_NAMESPACE, name)
}
