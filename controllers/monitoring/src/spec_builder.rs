//! Desired MonitoringInstance spec for a Binding.
//!
//! The builder is a pure function of the Binding and the operator settings.
//! It never fills in storage claim names; those are assigned by the platform
//! and carried forward by the reconciler.

use crate::error::ControllerError;
use crds::constants::{DEFAULT_SERVICE_TYPE, INSTANCE_SECRETS_NAME};
use crds::{
    Binding, Elasticsearch, ElasticsearchNode, Grafana, Kibana, MonitoringInstanceSpec, Prometheus,
    Resources, Storage,
};
use kube::ResourceExt;

/// Builds the desired spec of the MonitoringInstance owned by a Binding
pub trait SpecBuilder: Send + Sync {
    fn build(&self, binding: &Binding) -> Result<MonitoringInstanceSpec, ControllerError>;
}

/// Replica count and memory request for one Elasticsearch node role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSettings {
    pub replicas: i32,
    pub request_memory: String,
}

/// Operator-wide settings applied to every MonitoringInstance
///
/// Empty strings and zero replicas mean "no preference".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceSettings {
    /// Base DNS name of the platform, e.g. `example.com`
    pub platform_uri: String,
    pub storage_enabled: bool,
    pub grafana_storage_size: String,
    pub prometheus_storage_size: String,
    pub elasticsearch_storage_size: String,
    pub grafana_request_memory: String,
    pub prometheus_request_memory: String,
    pub kibana_request_memory: String,
    pub es_ingest_node: NodeSettings,
    pub es_master_node: NodeSettings,
    pub es_data_node: NodeSettings,
}

/// `SpecBuilder` driven by `InstanceSettings`
#[derive(Debug, Clone)]
pub struct DefaultSpecBuilder {
    settings: InstanceSettings,
}

impl DefaultSpecBuilder {
    pub fn new(settings: InstanceSettings) -> Self {
        Self { settings }
    }

    fn storage(&self, size: &str) -> Storage {
        Storage {
            size: if self.settings.storage_enabled {
                size.to_string()
            } else {
                String::new()
            },
            pvc_names: Vec::new(),
        }
    }

    fn resources(request_memory: &str) -> Resources {
        Resources {
            request_memory: request_memory.to_string(),
        }
    }

    fn node(settings: &NodeSettings) -> ElasticsearchNode {
        ElasticsearchNode {
            replicas: settings.replicas,
            resources: Self::resources(&settings.request_memory),
        }
    }
}

impl SpecBuilder for DefaultSpecBuilder {
    fn build(&self, binding: &Binding) -> Result<MonitoringInstanceSpec, ControllerError> {
        let platform_uri = self.settings.platform_uri.trim();
        if platform_uri.is_empty() {
            return Err(ControllerError::InvalidInput("URI must not be empty".to_string()));
        }

        let name = binding.name_any();
        let s = &self.settings;

        Ok(MonitoringInstanceSpec {
            uri: format!("monitoring.{}.{}", name, platform_uri),
            auto_secret: true,
            secrets_name: INSTANCE_SECRETS_NAME.to_string(),
            cascading_delete: true,
            grafana: Grafana {
                enabled: true,
                storage: self.storage(&s.grafana_storage_size),
                dashboards_config_map: format!("{}-dashboards", name),
                resources: Self::resources(&s.grafana_request_memory),
            },
            prometheus: Prometheus {
                enabled: true,
                storage: self.storage(&s.prometheus_storage_size),
                resources: Self::resources(&s.prometheus_request_memory),
            },
            elasticsearch: Elasticsearch {
                enabled: true,
                storage: self.storage(&s.elasticsearch_storage_size),
                ingest_node: Self::node(&s.es_ingest_node),
                master_node: Self::node(&s.es_master_node),
                data_node: Self::node(&s.es_data_node),
            },
            kibana: Kibana {
                enabled: true,
                resources: Self::resources(&s.kibana_request_memory),
            },
            ingress_target_dns_name: format!("ingress.{}", platform_uri),
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_binding, test_settings};

    #[test]
    fn test_build_derives_names_from_binding() {
        let builder = DefaultSpecBuilder::new(test_settings());
        let spec = builder.build(&create_test_binding("orders", "apps")).unwrap();

        assert_eq!(spec.uri, "monitoring.orders.example.com");
        assert_eq!(spec.ingress_target_dns_name, "ingress.example.com");
        assert_eq!(spec.grafana.dashboards_config_map, "orders-dashboards");
        assert_eq!(spec.secrets_name, "monitoring-instance-secrets");
        assert_eq!(spec.service_type, "ClusterIP");
        assert!(spec.auto_secret);
        assert!(spec.cascading_delete);
        assert!(spec.grafana.enabled && spec.prometheus.enabled && spec.elasticsearch.enabled && spec.kibana.enabled);
        assert_eq!(spec.prometheus.resources.request_memory, "128Mi");
        assert_eq!(spec.elasticsearch.data_node.replicas, 2);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = DefaultSpecBuilder::new(test_settings());
        let binding = create_test_binding("orders", "apps");
        assert_eq!(builder.build(&binding).unwrap(), builder.build(&binding).unwrap());
    }

    #[test]
    fn test_storage_size_only_when_storage_enabled() {
        let mut settings = test_settings();
        let enabled = DefaultSpecBuilder::new(settings.clone())
            .build(&create_test_binding("orders", "apps"))
            .unwrap();
        assert_eq!(enabled.grafana.storage.size, "10Gi");
        assert_eq!(enabled.prometheus.storage.size, "50Gi");
        assert_eq!(enabled.elasticsearch.storage.size, "");
        assert!(enabled.grafana.storage.pvc_names.is_empty());

        settings.storage_enabled = false;
        let disabled = DefaultSpecBuilder::new(settings)
            .build(&create_test_binding("orders", "apps"))
            .unwrap();
        assert_eq!(disabled.grafana.storage.size, "");
        assert_eq!(disabled.prometheus.storage.size, "");
    }

    #[test]
    fn test_empty_uri_is_invalid_input() {
        let mut settings = test_settings();
        settings.platform_uri = "  ".to_string();
        let err = DefaultSpecBuilder::new(settings)
            .build(&create_test_binding("orders", "apps"))
            .unwrap_err();
        match err {
            ControllerError::InvalidInput(msg) => assert_eq!(msg, "URI must not be empty"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
