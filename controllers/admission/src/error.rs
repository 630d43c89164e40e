//! Admission webhook error types.

use resource_store::StoreError;
use thiserror::Error;

/// Errors that can occur while admitting a resource.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The resource breaks an admission rule; the message is shown to the user verbatim
    #[error("{0}")]
    Validation(String),

    /// A lookup needed to decide failed for reasons other than absence
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The review did not carry a decodable object
    #[error("Invalid object: {0}")]
    InvalidObject(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Webhook server failed
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    /// Kubernetes client setup failed
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),
}
