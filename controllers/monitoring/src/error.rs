//! Controller-specific error types.
//!
//! Store failures are split so the dispatch loop can tell an optimistic
//! concurrency conflict (re-run the whole reconcile soon) from an
//! infrastructure failure (back off).

use helm_client::HelmError;
use kube::Error as KubeError;
use kube_runtime::finalizer;
use resource_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the Monitoring Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error outside the resource store (status patches, client setup)
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// The Binding cannot produce a MonitoringInstance spec
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource store unreachable or failed unexpectedly
    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    /// Stale version token on update, or a concurrent create of the same instance
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Garbage collection stopped after deleting some instances
    #[error(
        "Deleted {deleted} MonitoringInstance(s) for binding {binding} before failing, {remaining} left: {source}"
    )]
    PartialFailure {
        binding: String,
        deleted: usize,
        remaining: usize,
        #[source]
        source: StoreError,
    },

    /// JSON conversion of an instance failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Helm release handling failed
    #[error("Helm error: {0}")]
    Helm(#[from] HelmError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Adding or removing the Binding finalizer failed, or the wrapped reconcile did
    #[error("Finalizer error: {0}")]
    Finalizer(#[source] Box<finalizer::Error<ControllerError>>),

    /// Metrics registry setup failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// Probe/metrics server failed
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl From<StoreError> for ControllerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) | StoreError::AlreadyExists(msg) => ControllerError::Conflict(msg),
            other => ControllerError::Store(other),
        }
    }
}

impl ControllerError {
    /// The reconcile error inside a finalizer error, or `self`
    pub fn root(&self) -> &ControllerError {
        match self {
            ControllerError::Finalizer(inner) => match inner.as_ref() {
                finalizer::Error::ApplyFailed(err) | finalizer::Error::CleanupFailed(err) => err.root(),
                _ => self,
            },
            _ => self,
        }
    }

    /// Short label used for the error metric
    pub fn kind(&self) -> &'static str {
        match self.root() {
            ControllerError::Kube(_) => "kube",
            ControllerError::InvalidInput(_) => "invalid_input",
            ControllerError::Store(_) => "store",
            ControllerError::Conflict(_) => "conflict",
            ControllerError::PartialFailure { .. } => "partial_failure",
            ControllerError::Serialization(_) => "serialization",
            ControllerError::Helm(_) => "helm",
            ControllerError::InvalidConfig(_) => "invalid_config",
            ControllerError::Finalizer(_) => "finalizer",
            ControllerError::Metrics(_) => "metrics",
            ControllerError::Watch(_) => "watch",
            ControllerError::Server(_) => "server",
        }
    }
}
