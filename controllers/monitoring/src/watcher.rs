//! Binding watcher.
//!
//! Drives the reconciler from a `kube_runtime::Controller`. A finalizer on
//! every Binding makes deletion run garbage collection before the Binding
//! disappears. Retry policy lives here, not in the reconciler:
//! - conflicts requeue after a short fixed delay
//! - invalid input waits for the Binding to change
//! - everything else backs off per Binding (Fibonacci, 1m..10m)
//!
//! Changes to an owned MonitoringInstance also requeue its Binding, so
//! out-of-band edits and deletions are repaired without waiting for the
//! periodic resync.

use crate::backoff::{BackoffTracker, CONFLICT_REQUEUE};
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use chrono::Utc;
use crds::constants::{BINDING_FINALIZER, BINDING_LABEL};
use crds::{Binding, InstanceState, MonitoringInstance};
use futures::StreamExt;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::finalizer::{finalizer, Event as FinalizerEvent};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Periodic resync of healthy Bindings
const RESYNC_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Shared state handed to every reconcile
pub struct Context {
    pub client: Client,
    pub reconciler: Reconciler,
    pub metrics: Metrics,
    pub backoff: BackoffTracker,
}

fn binding_key(binding: &Binding) -> String {
    format!("{}/{}", binding.namespace().unwrap_or_default(), binding.name_any())
}

/// Status patch for `binding`, or `None` when state and message are unchanged
///
/// `lastReconciled` only moves with the state, so repeated passes with the
/// same result never write.
pub(crate) fn status_patch(
    binding: &Binding,
    instance_name: &str,
    state: InstanceState,
    message: Option<String>,
) -> Option<serde_json::Value> {
    let current = binding.status.as_ref();
    if current.is_some_and(|s| s.state == state && s.message == message) {
        return None;
    }

    Some(serde_json::json!({
        "status": {
            "instanceName": instance_name,
            "state": state.as_str(),
            "message": message,
            "lastReconciled": Utc::now(),
        }
    }))
}

/// The Binding that owns `instance`, from its ownership labels
///
/// Instances without a recorded owner namespace map to nothing; the
/// periodic resync adopts them.
pub(crate) fn binding_for_instance(instance: &MonitoringInstance) -> Option<ObjectRef<Binding>> {
    let name = instance.labels().get(BINDING_LABEL)?;
    let namespace = Reconciler::owner_namespace(instance)?;
    Some(ObjectRef::new(name).within(namespace))
}

/// Requeue decision for a failed reconcile of the Binding at `key`
pub(crate) fn retry_action(error: &ControllerError, key: &str, backoff: &BackoffTracker) -> Action {
    match error.root() {
        ControllerError::Conflict(_) => Action::requeue(CONFLICT_REQUEUE),
        ControllerError::InvalidInput(_) => Action::await_change(),
        _ => Action::requeue(backoff.next_delay(key)),
    }
}

async fn patch_status(
    api: &Api<Binding>,
    binding: &Binding,
    state: InstanceState,
    message: Option<String>,
) -> Result<(), ControllerError> {
    let name = binding.name_any();
    let Some(patch) = status_patch(binding, &name, state, message) else {
        debug!("Binding {} status unchanged", binding_key(binding));
        return Ok(());
    };
    api.patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

async fn apply(binding: Arc<Binding>, api: &Api<Binding>, ctx: &Context) -> Result<Action, ControllerError> {
    let started = Instant::now();
    match ctx.reconciler.reconcile(&binding).await {
        Ok(outcome) => {
            ctx.metrics.record_reconcile(outcome.as_str(), started.elapsed());
            ctx.backoff.reset(&binding_key(&binding));
            if outcome != ReconcileOutcome::Unchanged {
                info!("Binding {} reconciled: {}", binding_key(&binding), outcome.as_str());
            }
            patch_status(api, &binding, outcome.state(), None).await?;
            Ok(Action::requeue(RESYNC_INTERVAL))
        }
        Err(e) => {
            // Best effort; the reconcile error is what gets retried
            if let Err(status_err) = patch_status(api, &binding, InstanceState::Failed, Some(e.to_string())).await {
                warn!("Failed to record failure on Binding {}: {}", binding_key(&binding), status_err);
            }
            Err(e)
        }
    }
}

async fn cleanup(binding: Arc<Binding>, ctx: &Context) -> Result<Action, ControllerError> {
    let started = Instant::now();
    let deleted = ctx
        .reconciler
        .delete_owned_by(&binding.name_any(), &binding.namespace().unwrap_or_default())
        .await?;
    ctx.metrics.record_cleanup(deleted, started.elapsed());
    ctx.backoff.reset(&binding_key(&binding));
    info!(
        "Binding {} deleted, removed {} MonitoringInstance(s)",
        binding_key(&binding),
        deleted
    );
    Ok(Action::await_change())
}

async fn reconcile(binding: Arc<Binding>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let namespace = binding
        .namespace()
        .ok_or_else(|| ControllerError::InvalidInput(format!("Binding {} has no namespace", binding.name_any())))?;
    let api: Api<Binding> = Api::namespaced(ctx.client.clone(), &namespace);

    debug!("Reconciling Binding {}", binding_key(&binding));
    finalizer(&api, BINDING_FINALIZER, binding, |event| async {
        match event {
            FinalizerEvent::Apply(binding) => apply(binding, &api, &ctx).await,
            FinalizerEvent::Cleanup(binding) => cleanup(binding, &ctx).await,
        }
    })
    .await
    .map_err(|e| ControllerError::Finalizer(Box::new(e)))
}

fn error_policy(binding: Arc<Binding>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let key = binding_key(&binding);
    ctx.metrics.record_error(error.kind());
    let action = retry_action(error, &key, &ctx.backoff);
    error!(
        "Reconciliation error for Binding {} (attempt {}): {}; next action {:?}",
        key,
        ctx.backoff.error_count(&key),
        error,
        action
    );
    action
}

/// Watch Bindings and their MonitoringInstances and reconcile until the stream ends
pub async fn watch_bindings(
    api: Api<Binding>,
    instances: Api<MonitoringInstance>,
    ctx: Arc<Context>,
) -> Result<(), ControllerError> {
    info!("Starting Binding watcher");

    // Debounce batches bursts of events on the same Binding
    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(5))
        .concurrency(3);

    Controller::new(api, watcher::Config::default())
        .watches(
            instances,
            watcher::Config::default().labels(BINDING_LABEL),
            |instance| binding_for_instance(&instance),
        )
        .with_config(controller_config)
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((binding, _)) => debug!("Reconciled Binding {}/{}", binding.namespace.unwrap_or_default(), binding.name),
                Err(e) => error!("Binding controller error: {}", e),
            }
        })
        .await;

    Err(ControllerError::Watch("Binding watch stream ended".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_binding, create_test_instance};
    use crds::constants::SYSTEM_NAMESPACE;
    use crds::{BindingStatus, MonitoringInstanceSpec};
    use std::collections::BTreeMap;
    use kube_runtime::finalizer;
    use resource_store::StoreError;

    #[test]
    fn test_status_patch_only_when_state_changes() {
        let mut binding = create_test_binding("orders", "apps");

        let patch = status_patch(&binding, "orders", InstanceState::Created, None).unwrap();
        assert_eq!(patch["status"]["state"], "Created");
        assert_eq!(patch["status"]["instanceName"], "orders");
        assert!(patch["status"]["lastReconciled"].is_string());

        binding.status = Some(BindingStatus {
            instance_name: Some("orders".to_string()),
            state: InstanceState::Created,
            message: None,
            last_reconciled: Some(Utc::now()),
        });
        assert!(status_patch(&binding, "orders", InstanceState::Created, None).is_none());
        assert!(status_patch(&binding, "orders", InstanceState::Unchanged, None).is_some());
        assert!(status_patch(&binding, "orders", InstanceState::Created, Some("boom".to_string())).is_some());
    }

    #[test]
    fn test_instance_events_map_to_owning_binding() {
        let instance = create_test_instance("orders", SYSTEM_NAMESPACE, "orders", MonitoringInstanceSpec::default());
        assert_eq!(
            binding_for_instance(&instance),
            Some(ObjectRef::<Binding>::new("orders").within("apps"))
        );

        let mut unowned = instance.clone();
        unowned.metadata.labels = Some(BTreeMap::from([(BINDING_LABEL.to_string(), "orders".to_string())]));
        assert_eq!(binding_for_instance(&unowned), None);

        unowned.metadata.labels = None;
        assert_eq!(binding_for_instance(&unowned), None);
    }

    #[test]
    fn test_retry_policy() {
        let backoff = BackoffTracker::new();

        let conflict = ControllerError::Conflict("stale".to_string());
        assert_eq!(retry_action(&conflict, "apps/orders", &backoff), Action::requeue(CONFLICT_REQUEUE));

        let invalid = ControllerError::Finalizer(Box::new(finalizer::Error::ApplyFailed(
            ControllerError::InvalidInput("URI must not be empty".to_string()),
        )));
        assert_eq!(retry_action(&invalid, "apps/orders", &backoff), Action::await_change());
        assert_eq!(backoff.error_count("apps/orders"), 0);

        let store = ControllerError::Store(StoreError::Unavailable("connection refused".to_string()));
        assert_eq!(
            retry_action(&store, "apps/orders", &backoff),
            Action::requeue(Duration::from_secs(60))
        );
        assert_eq!(backoff.error_count("apps/orders"), 1);
    }
}
