//! Kubernetes-backed resource store
//!
//! Implements `ResourceStore` on top of `kube::Api`, translating API
//! status codes into `StoreError` variants (404 → `NotFound`,
//! 409 → `Conflict`/`AlreadyExists`).

use crate::error::StoreError;
use crate::selector::LabelSelector;
use crate::store_trait::ResourceStore;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::debug;

/// Resource store talking to the Kubernetes API server
pub struct KubeStore<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for KubeStore<K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K> KubeStore<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
{
    /// Create a store for resources of kind `K`
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    fn api(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn describe(namespace: &str, name: &str) -> String {
        format!("{} {}/{}", K::kind(&()), namespace, name)
    }

    /// Namespace and name of `resource`, both required for writes
    fn identity(resource: &K) -> Result<(String, String), StoreError> {
        let meta = resource.meta();
        let name = meta.name.clone().ok_or_else(|| {
            StoreError::InvalidResource(format!("{} is missing metadata.name", K::kind(&())))
        })?;
        let namespace = meta.namespace.clone().ok_or_else(|| {
            StoreError::InvalidResource(format!("{} {} is missing metadata.namespace", K::kind(&()), name))
        })?;
        Ok((namespace, name))
    }
}

#[async_trait::async_trait]
impl<K> ResourceStore<K> for KubeStore<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<K, StoreError> {
        debug!("Getting {}", Self::describe(namespace, name));
        self.api(namespace)
            .get(name)
            .await
            .map_err(|e| StoreError::from_kube(e, &Self::describe(namespace, name)))
    }

    async fn list(&self, namespace: Option<&str>, selector: &LabelSelector) -> Result<Vec<K>, StoreError> {
        let api: Api<K> = match namespace {
            Some(ns) => self.api(ns),
            None => Api::all(self.client.clone()),
        };
        let mut params = ListParams::default();
        if !selector.is_empty() {
            params = params.labels(&selector.to_query());
        }

        debug!(
            "Listing {} in {} matching {}",
            K::kind(&()),
            namespace.unwrap_or("all namespaces"),
            selector
        );
        let list = api
            .list(&params)
            .await
            .map_err(|e| StoreError::from_kube(e, &format!("{} list", K::kind(&()))))?;
        Ok(list.items)
    }

    async fn create(&self, resource: &K) -> Result<K, StoreError> {
        let (namespace, name) = Self::identity(resource)?;
        debug!("Creating {}", Self::describe(&namespace, &name));
        self.api(&namespace)
            .create(&PostParams::default(), resource)
            .await
            .map_err(|e| StoreError::from_kube(e, &Self::describe(&namespace, &name)))
    }

    async fn update(&self, resource: &K) -> Result<K, StoreError> {
        let (namespace, name) = Self::identity(resource)?;
        debug!(
            "Replacing {} at version {}",
            Self::describe(&namespace, &name),
            resource.meta().resource_version.as_deref().unwrap_or("<unset>")
        );
        self.api(&namespace)
            .replace(&name, &PostParams::default(), resource)
            .await
            .map_err(|e| StoreError::from_kube(e, &Self::describe(&namespace, &name)))
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        debug!("Deleting {}", Self::describe(namespace, name));
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| StoreError::from_kube(e, &Self::describe(namespace, name)))
    }
}
