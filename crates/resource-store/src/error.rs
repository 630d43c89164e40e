//! Resource store errors

use thiserror::Error;

/// Errors that can occur when reading or writing the resource store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The write carried a stale version token
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A create targeted a name that is already taken
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The resource is missing identity fields (name/namespace)
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    /// Kubernetes API error other than not-found/conflict
    #[error("Kubernetes error: {0}")]
    Kube(kube::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store unreachable or refused the request
    #[error("Resource store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// True when the target resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// True when an optimistic-concurrency check rejected the write
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    /// Classifies a kube client error for the object `what` (e.g. "MonitoringInstance ns/name")
    pub(crate) fn from_kube(err: kube::Error, what: &str) -> Self {
        match &err {
            kube::Error::Api(response) if response.code == 404 => {
                StoreError::NotFound(what.to_string())
            }
            kube::Error::Api(response) if response.code == 409 && response.reason == "AlreadyExists" => {
                StoreError::AlreadyExists(what.to_string())
            }
            kube::Error::Api(response) if response.code == 409 => {
                StoreError::Conflict(format!("{}: {}", what, response.message))
            }
            _ => StoreError::Kube(err),
        }
    }
}
