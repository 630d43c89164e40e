//! Deletion of the MonitoringInstances owned by a Binding.

use super::Reconciler;
use crate::error::ControllerError;
use crds::constants::{BINDING_LABEL, BINDING_NAMESPACE_LABEL};
use kube::ResourceExt;
use resource_store::LabelSelector;
use tracing::{debug, error, info};

impl Reconciler {
    /// Delete every MonitoringInstance labelled for `binding`, in any namespace
    ///
    /// Instances that are already gone are skipped. The first other failure
    /// stops the batch: it is returned as-is when nothing was deleted yet,
    /// otherwise wrapped in `PartialFailure`. Returns the number deleted.
    ///
    /// Instances created after the list call are left for the next pass.
    pub async fn delete_all_for_binding(&self, binding: &str) -> Result<usize, ControllerError> {
        self.delete_selected(binding, &LabelSelector::eq(BINDING_LABEL, binding))
            .await
    }

    /// Like [`Reconciler::delete_all_for_binding`], restricted to instances
    /// recorded as owned by the Binding in `namespace`
    ///
    /// Cleanup of one Binding leaves a same-named Binding's instance alone.
    pub async fn delete_owned_by(&self, binding: &str, namespace: &str) -> Result<usize, ControllerError> {
        let selector = LabelSelector::eq(BINDING_LABEL, binding).and(BINDING_NAMESPACE_LABEL, namespace);
        self.delete_selected(binding, &selector).await
    }

    async fn delete_selected(&self, binding: &str, selector: &LabelSelector) -> Result<usize, ControllerError> {
        let instances = self.instances.list(None, selector).await?;
        let total = instances.len();
        debug!("Found {} MonitoringInstance(s) for binding {}", total, binding);

        let mut deleted = 0;
        for (index, instance) in instances.iter().enumerate() {
            let namespace = instance.namespace().unwrap_or_default();
            let name = instance.name_any();

            match self.instances.delete(&namespace, &name).await {
                Ok(()) => {
                    info!("Deleted MonitoringInstance {}/{} for binding {}", namespace, name, binding);
                    deleted += 1;
                }
                Err(e) if e.is_not_found() => {
                    debug!("MonitoringInstance {}/{} already deleted", namespace, name);
                }
                Err(e) => {
                    error!(
                        "Failed to delete MonitoringInstance {}/{} for binding {}: {}",
                        namespace, name, binding, e
                    );
                    if deleted == 0 {
                        return Err(e.into());
                    }
                    return Err(ControllerError::PartialFailure {
                        binding: binding.to_string(),
                        deleted,
                        remaining: total - index,
                        source: e,
                    });
                }
            }
        }

        Ok(deleted)
    }
}
