//! Mock ResourceStore for unit testing
//!
//! This module provides an in-memory implementation of `ResourceStore`
//! that can be used in unit tests without a running cluster.
//!
//! The mock behaves like the API server where it matters to callers:
//! - every write assigns a fresh `resourceVersion`
//! - an update carrying a stale `resourceVersion` fails with `Conflict`
//! - creating an existing object fails with `AlreadyExists`
//!
//! Tests can inject failures per operation (optionally per object) and
//! inspect the ordered log of calls that reached the store.

use crate::error::StoreError;
use crate::selector::LabelSelector;
use crate::store_trait::ResourceStore;
use kube::Resource;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Store operation, used to target injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    List,
    Create,
    Update,
    Delete,
}

/// A call that reached the mock store, in issue order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get { namespace: String, name: String },
    List { namespace: Option<String>, selector: String },
    Create { namespace: String, name: String },
    Update { namespace: String, name: String },
    Delete { namespace: String, name: String },
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreCall::Get { .. } => StoreOp::Get,
            StoreCall::List { .. } => StoreOp::List,
            StoreCall::Create { .. } => StoreOp::Create,
            StoreCall::Update { .. } => StoreOp::Update,
            StoreCall::Delete { .. } => StoreOp::Delete,
        }
    }
}

/// Failure returned by the mock instead of performing an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedFailure {
    NotFound,
    Conflict,
    Unavailable(String),
}

impl InjectedFailure {
    fn to_error(&self, what: &str) -> StoreError {
        match self {
            InjectedFailure::NotFound => StoreError::NotFound(what.to_string()),
            InjectedFailure::Conflict => StoreError::Conflict(format!("{}: injected conflict", what)),
            InjectedFailure::Unavailable(msg) => StoreError::Unavailable(msg.clone()),
        }
    }
}

type ObjectKey = (String, String);

/// Mock ResourceStore for testing
///
/// Objects are kept in a `BTreeMap` keyed by (namespace, name), so `list`
/// returns them in a stable order.
pub struct MockStore<K> {
    pub(crate) objects: Arc<Mutex<BTreeMap<ObjectKey, K>>>,
    pub(crate) failures: Arc<Mutex<HashMap<(StoreOp, Option<ObjectKey>), InjectedFailure>>>,
    pub(crate) calls: Arc<Mutex<Vec<StoreCall>>>,
    // Counter for generating resource versions
    pub(crate) next_version: Arc<Mutex<u64>>,
}

impl<K> Clone for MockStore<K> {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
            failures: Arc::clone(&self.failures),
            calls: Arc::clone(&self.calls),
            next_version: Arc::clone(&self.next_version),
        }
    }
}

impl<K> Default for MockStore<K>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> MockStore<K>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    /// Create an empty mock store
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(BTreeMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            next_version: Arc::new(Mutex::new(1)),
        }
    }

    /// Add an object to the mock store (for test setup)
    ///
    /// Assigns a resource version and uid when the object has none. Not
    /// recorded in the call log.
    pub fn insert(&self, mut resource: K) -> K {
        let key = Self::key_of(&resource);
        if resource.meta().resource_version.is_none() {
            resource.meta_mut().resource_version = Some(self.next_version());
        }
        if resource.meta().uid.is_none() {
            resource.meta_mut().uid = Some(uuid::Uuid::new_v4().to_string());
        }
        self.objects.lock().unwrap().insert(key, resource.clone());
        resource
    }

    /// Current stored copy of an object
    pub fn object(&self, namespace: &str, name: &str) -> Option<K> {
        self.objects
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Every stored object, ordered by (namespace, name)
    pub fn objects(&self) -> Vec<K> {
        self.objects.lock().unwrap().values().cloned().collect()
    }

    /// Modify a stored object out-of-band, as another writer would
    ///
    /// Bumps the resource version, so version tokens captured earlier
    /// become stale. Returns false when the object does not exist.
    pub fn modify(&self, namespace: &str, name: &str, change: impl FnOnce(&mut K)) -> bool {
        let version = self.next_version();
        let mut objects = self.objects.lock().unwrap();
        match objects.get_mut(&(namespace.to_string(), name.to_string())) {
            Some(resource) => {
                change(resource);
                resource.meta_mut().resource_version = Some(version);
                true
            }
            None => false,
        }
    }

    /// Fail every `op` call with `failure`
    pub fn fail_all(&self, op: StoreOp, failure: InjectedFailure) {
        self.failures.lock().unwrap().insert((op, None), failure);
    }

    /// Fail `op` calls addressing one object with `failure`
    pub fn fail_on(&self, op: StoreOp, namespace: &str, name: &str, failure: InjectedFailure) {
        self.failures
            .lock()
            .unwrap()
            .insert((op, Some((namespace.to_string(), name.to_string()))), failure);
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Ordered log of calls issued against the store
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls of one operation issued so far
    pub fn call_count(&self, op: StoreOp) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.op() == op).count()
    }

    /// Forget recorded calls (keeps objects and failures)
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Generate next resource version
    pub(crate) fn next_version(&self) -> String {
        let mut version = self.next_version.lock().unwrap();
        let current = *version;
        *version += 1;
        current.to_string()
    }

    fn key_of(resource: &K) -> ObjectKey {
        let meta = resource.meta();
        (
            meta.namespace.clone().unwrap_or_default(),
            meta.name.clone().unwrap_or_default(),
        )
    }

    fn describe(namespace: &str, name: &str) -> String {
        format!("{} {}/{}", K::kind(&()), namespace, name)
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Injected failure for `op` on the given object, if any
    fn injected(&self, op: StoreOp, key: Option<&ObjectKey>) -> Option<InjectedFailure> {
        let failures = self.failures.lock().unwrap();
        key.and_then(|k| failures.get(&(op, Some(k.clone()))))
            .or_else(|| failures.get(&(op, None)))
            .cloned()
    }

    fn identity(resource: &K) -> Result<ObjectKey, StoreError> {
        let (namespace, name) = Self::key_of(resource);
        if name.is_empty() {
            return Err(StoreError::InvalidResource(format!(
                "{} is missing metadata.name",
                K::kind(&())
            )));
        }
        if namespace.is_empty() {
            return Err(StoreError::InvalidResource(format!(
                "{} {} is missing metadata.namespace",
                K::kind(&()),
                name
            )));
        }
        Ok((namespace, name))
    }
}

#[async_trait::async_trait]
impl<K> ResourceStore<K> for MockStore<K>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<K, StoreError> {
        let key = (namespace.to_string(), name.to_string());
        self.record(StoreCall::Get {
            namespace: key.0.clone(),
            name: key.1.clone(),
        });
        if let Some(failure) = self.injected(StoreOp::Get, Some(&key)) {
            return Err(failure.to_error(&Self::describe(namespace, name)));
        }

        self.objects
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(Self::describe(namespace, name)))
    }

    async fn list(&self, namespace: Option<&str>, selector: &LabelSelector) -> Result<Vec<K>, StoreError> {
        self.record(StoreCall::List {
            namespace: namespace.map(str::to_string),
            selector: selector.to_query(),
        });
        if let Some(failure) = self.injected(StoreOp::List, None) {
            return Err(failure.to_error(&format!("{} list", K::kind(&()))));
        }

        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|((ns, _), _)| namespace.is_none_or(|wanted| wanted == ns))
            .filter(|(_, resource)| selector.matches(resource.meta().labels.as_ref()))
            .map(|(_, resource)| resource.clone())
            .collect())
    }

    async fn create(&self, resource: &K) -> Result<K, StoreError> {
        let key = Self::identity(resource)?;
        self.record(StoreCall::Create {
            namespace: key.0.clone(),
            name: key.1.clone(),
        });
        if let Some(failure) = self.injected(StoreOp::Create, Some(&key)) {
            return Err(failure.to_error(&Self::describe(&key.0, &key.1)));
        }

        let version = self.next_version();
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists(Self::describe(&key.0, &key.1)));
        }

        let mut stored = resource.clone();
        stored.meta_mut().resource_version = Some(version);
        stored.meta_mut().uid = Some(uuid::Uuid::new_v4().to_string());
        objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, resource: &K) -> Result<K, StoreError> {
        let key = Self::identity(resource)?;
        self.record(StoreCall::Update {
            namespace: key.0.clone(),
            name: key.1.clone(),
        });
        if let Some(failure) = self.injected(StoreOp::Update, Some(&key)) {
            return Err(failure.to_error(&Self::describe(&key.0, &key.1)));
        }

        let version = self.next_version();
        let mut objects = self.objects.lock().unwrap();
        let current = objects
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(Self::describe(&key.0, &key.1)))?;

        // Unconditional update when no token is presented, as the API server does
        if let Some(presented) = resource.meta().resource_version.as_deref() {
            let stored = current.meta().resource_version.as_deref().unwrap_or_default();
            if presented != stored {
                return Err(StoreError::Conflict(format!(
                    "{}: version {} is stale, current is {}",
                    Self::describe(&key.0, &key.1),
                    presented,
                    stored
                )));
            }
        }

        let mut stored = resource.clone();
        stored.meta_mut().uid = current.meta().uid.clone();
        stored.meta_mut().resource_version = Some(version);
        objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let key = (namespace.to_string(), name.to_string());
        self.record(StoreCall::Delete {
            namespace: key.0.clone(),
            name: key.1.clone(),
        });
        if let Some(failure) = self.injected(StoreOp::Delete, Some(&key)) {
            return Err(failure.to_error(&Self::describe(namespace, name)));
        }

        self.objects
            .lock()
            .unwrap()
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(Self::describe(namespace, name)))
    }
}
