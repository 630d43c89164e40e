//! Configuration from environment variables.

use crate::error::ControllerError;
use crate::spec_builder::{InstanceSettings, NodeSettings};
use crds::constants::SYSTEM_NAMESPACE;
use std::net::SocketAddr;
use tracing::warn;

const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CHART_RELEASE: &str = "monitoring-operator";

/// Helm release upgraded once at startup when `CHART_DIR` is set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSettings {
    pub release: String,
    pub namespace: String,
    pub chart_dir: String,
    pub overrides_file: Option<String>,
}

/// Monitoring Controller configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub settings: InstanceSettings,
    /// Namespace to watch Bindings in; all namespaces when unset
    pub namespace: Option<String>,
    pub metrics_addr: SocketAddr,
    pub chart: Option<ChartSettings>,
}

impl ControllerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();

        let platform_uri = var("PLATFORM_URI");
        if platform_uri.is_empty() {
            return Err(ControllerError::InvalidConfig(
                "PLATFORM_URI environment variable is required".to_string(),
            ));
        }

        let node = |prefix: &str| -> Result<NodeSettings, ControllerError> {
            Ok(NodeSettings {
                replicas: parse_replicas(&format!("{prefix}_REPLICAS"), &var(&format!("{prefix}_REPLICAS")))?,
                request_memory: var(&format!("{prefix}_REQUEST_MEMORY")),
            })
        };

        let settings = InstanceSettings {
            platform_uri,
            storage_enabled: parse_storage_flag(&var("ENABLE_MONITORING_STORAGE")),
            grafana_storage_size: var("GRAFANA_DATA_STORAGE_SIZE"),
            prometheus_storage_size: var("PROMETHEUS_DATA_STORAGE_SIZE"),
            elasticsearch_storage_size: var("ELASTICSEARCH_DATA_STORAGE_SIZE"),
            grafana_request_memory: var("GRAFANA_REQUEST_MEMORY"),
            prometheus_request_memory: var("PROMETHEUS_REQUEST_MEMORY"),
            kibana_request_memory: var("KIBANA_REQUEST_MEMORY"),
            es_ingest_node: node("ES_INGEST_NODE")?,
            es_master_node: node("ES_MASTER_NODE")?,
            es_data_node: node("ES_DATA_NODE")?,
        };

        let metrics_addr = match var("METRICS_ADDR") {
            addr if addr.is_empty() => DEFAULT_METRICS_ADDR.to_string(),
            addr => addr,
        };
        let metrics_addr = metrics_addr.parse::<SocketAddr>().map_err(|e| {
            ControllerError::InvalidConfig(format!("METRICS_ADDR {} is not a socket address: {}", metrics_addr, e))
        })?;

        let namespace = Some(var("WATCH_NAMESPACE")).filter(|ns| !ns.is_empty());

        let chart = Some(var("CHART_DIR"))
            .filter(|dir| !dir.is_empty())
            .map(|chart_dir| ChartSettings {
                release: Some(var("CHART_RELEASE"))
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| DEFAULT_CHART_RELEASE.to_string()),
                namespace: Some(var("CHART_NAMESPACE"))
                    .filter(|ns| !ns.is_empty())
                    .unwrap_or_else(|| SYSTEM_NAMESPACE.to_string()),
                chart_dir,
                overrides_file: Some(var("CHART_OVERRIDES_FILE")).filter(|f| !f.is_empty()),
            });

        Ok(Self {
            settings,
            namespace,
            metrics_addr,
            chart,
        })
    }
}

/// Storage is disabled when the flag is unset or unparseable
fn parse_storage_flag(value: &str) -> bool {
    match value.to_ascii_lowercase().as_str() {
        "" => false,
        "1" | "t" | "true" => true,
        "0" | "f" | "false" => false,
        other => {
            warn!(
                "ENABLE_MONITORING_STORAGE has invalid value {:?}, monitoring storage disabled",
                other
            );
            false
        }
    }
}

fn parse_replicas(key: &str, value: &str) -> Result<i32, ControllerError> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<i32>()
        .ok()
        .filter(|replicas| *replicas >= 0)
        .ok_or_else(|| ControllerError::InvalidConfig(format!("{key} must be a non-negative integer, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ControllerConfig, ControllerError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ControllerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_platform_uri_is_required() {
        assert!(matches!(load(&[]), Err(ControllerError::InvalidConfig(_))));
        assert!(matches!(load(&[("PLATFORM_URI", " ")]), Err(ControllerError::InvalidConfig(_))));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("PLATFORM_URI", "example.com")]).unwrap();
        assert_eq!(config.settings.platform_uri, "example.com");
        assert!(!config.settings.storage_enabled);
        assert_eq!(config.settings.es_data_node, NodeSettings::default());
        assert_eq!(config.metrics_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.namespace, None);
        assert_eq!(config.chart, None);
    }

    #[test]
    fn test_reads_instance_settings() {
        let config = load(&[
            ("PLATFORM_URI", "example.com"),
            ("ENABLE_MONITORING_STORAGE", "TRUE"),
            ("GRAFANA_DATA_STORAGE_SIZE", "10Gi"),
            ("PROMETHEUS_REQUEST_MEMORY", "256Mi"),
            ("ES_DATA_NODE_REPLICAS", "3"),
            ("ES_DATA_NODE_REQUEST_MEMORY", "2Gi"),
            ("WATCH_NAMESPACE", "apps"),
            ("METRICS_ADDR", "127.0.0.1:9090"),
        ])
        .unwrap();

        assert!(config.settings.storage_enabled);
        assert_eq!(config.settings.grafana_storage_size, "10Gi");
        assert_eq!(config.settings.prometheus_request_memory, "256Mi");
        assert_eq!(
            config.settings.es_data_node,
            NodeSettings {
                replicas: 3,
                request_memory: "2Gi".to_string()
            }
        );
        assert_eq!(config.namespace.as_deref(), Some("apps"));
        assert_eq!(config.metrics_addr.port(), 9090);
    }

    #[test]
    fn test_invalid_storage_flag_disables_storage() {
        let config = load(&[("PLATFORM_URI", "example.com"), ("ENABLE_MONITORING_STORAGE", "yes please")]).unwrap();
        assert!(!config.settings.storage_enabled);
    }

    #[test]
    fn test_invalid_replicas_rejected() {
        let err = load(&[("PLATFORM_URI", "example.com"), ("ES_MASTER_NODE_REPLICAS", "three")]).unwrap_err();
        assert!(err.to_string().contains("ES_MASTER_NODE_REPLICAS"));
        assert!(load(&[("PLATFORM_URI", "example.com"), ("ES_MASTER_NODE_REPLICAS", "-1")]).is_err());
    }

    #[test]
    fn test_chart_settings() {
        let config = load(&[
            ("PLATFORM_URI", "example.com"),
            ("CHART_DIR", "/charts/monitoring-operator"),
            ("CHART_OVERRIDES_FILE", "/etc/monitoring/overrides.yaml"),
        ])
        .unwrap();

        assert_eq!(
            config.chart,
            Some(ChartSettings {
                release: "monitoring-operator".to_string(),
                namespace: "monitoring-system".to_string(),
                chart_dir: "/charts/monitoring-operator".to_string(),
                overrides_file: Some("/etc/monitoring/overrides.yaml".to_string()),
            })
        );
    }
}
