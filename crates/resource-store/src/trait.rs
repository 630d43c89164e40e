//! ResourceStore trait for mocking
//!
//! This trait abstracts access to namespaced Kubernetes resources so the
//! reconciliation and admission logic never talks to `kube::Api` directly.
//! `KubeStore` implements it against a live cluster, and tests use the
//! in-memory `MockStore` from the `test-util` feature.

use crate::error::StoreError;
use crate::selector::LabelSelector;

/// Typed access to one kind of namespaced resource
///
/// The kind is the type parameter `K`; every method addresses objects of
/// that kind only. All async methods must be `Send` to work with Tokio's
/// work-stealing runtime.
#[async_trait::async_trait]
pub trait ResourceStore<K>: Send + Sync
where
    K: Send + Sync + 'static,
{
    /// Fetch a resource, failing with `StoreError::NotFound` when it does not exist
    async fn get(&self, namespace: &str, name: &str) -> Result<K, StoreError>;

    /// List resources matching `selector`, in one namespace or across all (`None`)
    async fn list(&self, namespace: Option<&str>, selector: &LabelSelector) -> Result<Vec<K>, StoreError>;

    /// Persist a new resource; namespace and name come from its metadata
    async fn create(&self, resource: &K) -> Result<K, StoreError>;

    /// Replace an existing resource
    ///
    /// When the resource carries a version token the store rejects the
    /// write with `StoreError::Conflict` if the stored object has moved on.
    async fn update(&self, resource: &K) -> Result<K, StoreError>;

    /// Delete a resource, failing with `StoreError::NotFound` when it does not exist
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError>;

    /// Fetch a resource, mapping absence to `Ok(None)`
    ///
    /// Lets callers tell "not found" from "lookup failed" without matching
    /// on error variants.
    async fn find(&self, namespace: &str, name: &str) -> Result<Option<K>, StoreError> {
        match self.get(namespace, name).await {
            Ok(resource) => Ok(Some(resource)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
