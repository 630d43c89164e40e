//! Shared names for the monitoring operator
//!
//! API group, namespaces, label keys and finalizers used by both the
//! reconciliation controller and the admission webhook.

/// API group of every CRD in this crate
pub const API_GROUP: &str = "monitoring.microscaler.io";

/// Namespace holding every `MonitoringInstance`
pub const SYSTEM_NAMESPACE: &str = "monitoring-system";

/// Namespace holding multi-cluster registration resources and their secrets
pub const MULTI_CLUSTER_NAMESPACE: &str = "monitoring-mc";

/// Label identifying resources owned by this operator
pub const K8S_APP_LABEL: &str = "k8s-app";

/// Value of [`K8S_APP_LABEL`] on operator-owned resources
pub const K8S_APP_VALUE: &str = API_GROUP;

/// Label carrying the name of the owning `Binding`
///
/// Garbage collection selects on this label alone.
pub const BINDING_LABEL: &str = "monitoring.microscaler.io/binding";

/// Label carrying the namespace of the owning `Binding`
///
/// Instance names come from the Binding name alone, so this label decides
/// which of several same-named Bindings owns an instance.
pub const BINDING_NAMESPACE_LABEL: &str = "monitoring.microscaler.io/binding-namespace";

/// Finalizer placed on `Binding` resources so instances are collected before the binding disappears
pub const BINDING_FINALIZER: &str = "monitoring.microscaler.io/cleanup";

/// Secret name (in the instance namespace) holding generated instance credentials
pub const INSTANCE_SECRETS_NAME: &str = "monitoring-instance-secrets";

/// Service exposure type for every monitoring instance
pub const DEFAULT_SERVICE_TYPE: &str = "ClusterIP";
