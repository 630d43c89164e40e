//! Kubernetes object references used by monitoring CRDs
//!
//! Provides standard Kubernetes-style object references for cross-resource references.
//! Workload references follow the Kubernetes `TypedLocalObjectReference` pattern
//! with apiGroup, kind, name, and optional namespace.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a workload targeted by a `Binding`
///
/// This follows the Kubernetes `TypedLocalObjectReference` pattern, which includes:
/// - `apiGroup`: The API group of the referenced workload (e.g., "apps")
/// - `kind`: The kind of the referenced workload (e.g., "Deployment")
/// - `name`: The name of the referenced workload (required)
/// - `namespace`: The namespace of the workload (optional, defaults to the binding namespace)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadReference {
    /// API group of the referenced workload ("" for the core group)
    #[serde(default)]
    pub api_group: String,

    /// Kind of the referenced workload (e.g., "Deployment", "StatefulSet")
    pub kind: String,

    /// Name of the referenced workload
    pub name: String,

    /// Namespace of the referenced workload (defaults to same namespace as the binding)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl WorkloadReference {
    /// Create a new reference with apiGroup, kind, and name (same namespace)
    pub fn new(api_group: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_group: api_group.into(),
            kind: kind.into(),
            name: name.into(),
            namespace: None,
        }
    }

    /// Create a new reference with apiGroup, kind, name, and namespace
    pub fn with_namespace(
        api_group: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::new(api_group, kind, name)
        }
    }
}

/// A (name, namespace) pair naming a `Secret`
///
/// The name may be empty when the referencing resource left it unset;
/// admission rejects such references before they are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    /// Secret name
    pub name: String,

    /// Namespace the secret must exist in
    pub namespace: String,
}

impl SecretReference {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// True when no secret name was given
    pub fn is_unset(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
