//! Binding CRD
//!
//! Declares that a set of workloads is monitored. Every `Binding` gets its
//! own `MonitoringInstance`, created and kept in sync by the monitoring
//! controller and collected when the binding is deleted.

use crate::references::WorkloadReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "monitoring.microscaler.io",
    version = "v1alpha1",
    kind = "Binding",
    namespaced,
    status = "BindingStatus",
    printcolumn = r#"{"name":"Instance","type":"string","jsonPath":".status.instanceName"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BindingSpec {
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Workloads monitored through this binding
    #[serde(default)]
    pub workloads: Vec<WorkloadReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BindingStatus {
    /// Name of the managed `MonitoringInstance`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,

    /// Outcome of the last reconciliation
    #[serde(default)]
    pub state: InstanceState,

    /// Error or informational message from the last reconciliation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Timestamp of the last state change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,
}

/// Reconciliation state of the instance owned by a binding
///
/// Serializes as PascalCase ("Created", "Failed", etc.).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum InstanceState {
    /// Not reconciled yet
    #[default]
    Pending,

    /// Instance created on the last pass
    Created,

    /// Instance updated on the last pass
    Updated,

    /// Instance already matched the binding
    Unchanged,

    /// Last pass failed
    Failed,
}

impl InstanceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Pending => "Pending",
            InstanceState::Created => "Created",
            InstanceState::Updated => "Updated",
            InstanceState::Unchanged => "Unchanged",
            InstanceState::Failed => "Failed",
        }
    }
}
