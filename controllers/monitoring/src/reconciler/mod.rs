//! Reconciliation of Bindings into MonitoringInstances.
//!
//! One MonitoringInstance per Binding, named after the Binding and kept in
//! the system namespace. `garbage_collect` removes them again when the
//! Binding goes away.

pub mod garbage_collect;


use crate::diff::{compare_ignore_target_empties, overlay_non_empty};
use crate::error::ControllerError;
use crate::spec_builder::SpecBuilder;
use crds::constants::{BINDING_LABEL, BINDING_NAMESPACE_LABEL, K8S_APP_LABEL, K8S_APP_VALUE, SYSTEM_NAMESPACE};
use crds::{Binding, InstanceState, MonitoringInstance, MonitoringInstanceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use resource_store::ResourceStore;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Terminal state of a successful reconcile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created,
    Updated,
    Unchanged,
}

impl ReconcileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Created => "created",
            ReconcileOutcome::Updated => "updated",
            ReconcileOutcome::Unchanged => "unchanged",
        }
    }

    /// State recorded in the Binding status
    pub fn state(&self) -> InstanceState {
        match self {
            ReconcileOutcome::Created => InstanceState::Created,
            ReconcileOutcome::Updated => InstanceState::Updated,
            ReconcileOutcome::Unchanged => InstanceState::Unchanged,
        }
    }
}

/// Reconciles Bindings into MonitoringInstances.
///
/// Holds no per-binding state, so different Bindings can be reconciled
/// concurrently. Errors are returned, never retried here.
pub struct Reconciler {
    pub(crate) instances: Arc<dyn ResourceStore<MonitoringInstance>>,
    pub(crate) spec_builder: Box<dyn SpecBuilder>,
    namespace: String,
}

impl Reconciler {
    /// Reconciler writing instances to the system namespace
    pub fn new(
        instances: Arc<dyn ResourceStore<MonitoringInstance>>,
        spec_builder: Box<dyn SpecBuilder>,
    ) -> Self {
        Self {
            instances,
            spec_builder,
            namespace: SYSTEM_NAMESPACE.to_string(),
        }
    }

    /// Labels every instance owned by the Binding `namespace/binding` carries
    pub fn instance_labels(binding: &str, namespace: &str) -> BTreeMap<String, String> {
        BTreeMap::from([
            (K8S_APP_LABEL.to_string(), K8S_APP_VALUE.to_string()),
            (BINDING_LABEL.to_string(), binding.to_string()),
            (BINDING_NAMESPACE_LABEL.to_string(), namespace.to_string()),
        ])
    }

    /// Namespace of the Binding recorded as owner of `instance`, if any
    pub fn owner_namespace(instance: &MonitoringInstance) -> Option<&str> {
        instance
            .metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(BINDING_NAMESPACE_LABEL))
            .map(String::as_str)
    }

    /// Converge the Binding's MonitoringInstance to its desired spec
    ///
    /// Creates the instance when absent. Otherwise copies storage claim names
    /// from the existing instance, diffs, and updates under the existing
    /// version token only when something differs.
    ///
    /// An instance owned by a same-named Binding in another namespace is
    /// never touched; that is `InvalidInput` for this Binding. Instances
    /// without a recorded owner are adopted.
    pub async fn reconcile(&self, binding: &Binding) -> Result<ReconcileOutcome, ControllerError> {
        let name = binding.name_any();
        let binding_namespace = binding.namespace().unwrap_or_default();
        let mut desired = self.spec_builder.build(binding)?;
        let labels = Self::instance_labels(&name, &binding_namespace);

        let Some(existing) = self.instances.find(&self.namespace, &name).await? else {
            info!(
                "Creating MonitoringInstance {}/{} for binding {}",
                self.namespace, name, name
            );
            self.instances.create(&self.new_instance(&name, labels, desired)).await?;
            return Ok(ReconcileOutcome::Created);
        };

        if let Some(owner) = Self::owner_namespace(&existing).filter(|owner| *owner != binding_namespace) {
            return Err(ControllerError::InvalidInput(format!(
                "MonitoringInstance {}/{} belongs to Binding {}/{}, not {}/{}",
                self.namespace, name, owner, name, binding_namespace, name
            )));
        }

        desired.preserve_storage_claims(&existing.spec);

        let current = Self::comparable(existing.metadata.labels.as_ref(), &existing.spec)?;
        let target = Self::comparable(Some(&labels), &desired)?;
        let diff = compare_ignore_target_empties(&current, &target);
        if diff.is_empty() {
            debug!("MonitoringInstance {}/{} is up to date", self.namespace, name);
            return Ok(ReconcileOutcome::Unchanged);
        }

        info!(
            "Updating MonitoringInstance {}/{} for binding {} ({} field(s) differ):\n{}",
            self.namespace,
            name,
            name,
            diff.len(),
            diff
        );

        let merged = overlay_non_empty(&current, &target);
        let mut updated = existing;
        updated.metadata.labels = serde_json::from_value(merged["metadata"]["labels"].clone())?;
        updated.spec = serde_json::from_value(merged["spec"].clone())?;
        self.instances.update(&updated).await?;
        Ok(ReconcileOutcome::Updated)
    }

    /// The parts of an instance this reconciler owns, in JSON form
    fn comparable(
        labels: Option<&BTreeMap<String, String>>,
        spec: &MonitoringInstanceSpec,
    ) -> Result<serde_json::Value, ControllerError> {
        Ok(json!({
            "metadata": { "labels": labels.cloned().unwrap_or_default() },
            "spec": serde_json::to_value(spec)?,
        }))
    }

    fn new_instance(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
        spec: MonitoringInstanceSpec,
    ) -> MonitoringInstance {
        MonitoringInstance {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(self.namespace.clone()),
                labels: Some(labels),
                ..Default::default()
            },
            spec,
        }
    }
}
