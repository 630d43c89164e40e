//! Admission rules for ManagedCluster resources.
//!
//! A ManagedCluster names the secret holding its Prometheus credentials.
//! The secret must be named and must already exist in the multi-cluster
//! namespace before the ManagedCluster is admitted.

use crate::error::AdmissionError;
use crds::{ManagedCluster, SecretReference};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use resource_store::ResourceStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Label used for the Prometheus secret in messages
pub const PROMETHEUS_SECRET_KIND: &str = "Prometheus";

/// Checks that a referenced secret exists
#[derive(Clone)]
pub struct SecretValidator {
    secrets: Arc<dyn ResourceStore<Secret>>,
}

impl SecretValidator {
    pub fn new(secrets: Arc<dyn ResourceStore<Secret>>) -> Self {
        Self { secrets }
    }

    /// Accept when `reference` names a secret present in its namespace
    ///
    /// `kind` names the secret's purpose in messages (e.g. `Prometheus`).
    /// A missing name or missing secret is a `Validation` error; any other
    /// lookup failure is a `Store` error.
    pub async fn validate(&self, kind: &str, reference: &SecretReference) -> Result<(), AdmissionError> {
        if reference.is_unset() {
            return Err(AdmissionError::Validation(format!(
                "the name of the {} secret in namespace {} must be specified",
                kind, reference.namespace
            )));
        }

        match self.secrets.find(&reference.namespace, &reference.name).await? {
            Some(_) => {
                debug!("{} secret {} found", kind, reference);
                Ok(())
            }
            None => Err(AdmissionError::Validation(format!(
                "the {} secret {} does not exist in namespace {}",
                kind, reference.name, reference.namespace
            ))),
        }
    }
}

/// Admission decisions for ManagedCluster create, update and delete
#[derive(Clone)]
pub struct AdmissionValidator {
    secrets: SecretValidator,
}

impl AdmissionValidator {
    pub fn new(secrets: SecretValidator) -> Self {
        Self { secrets }
    }

    pub async fn validate_create(&self, cluster: &ManagedCluster) -> Result<(), AdmissionError> {
        self.secrets
            .validate(PROMETHEUS_SECRET_KIND, &cluster.prometheus_secret_ref())
            .await?;
        info!("ManagedCluster {} accepted", cluster.name_any());
        Ok(())
    }

    /// Updates follow the create rule on the new object
    pub async fn validate_update(&self, _old: Option<&ManagedCluster>, cluster: &ManagedCluster) -> Result<(), AdmissionError> {
        self.validate_create(cluster).await
    }

    /// Deletes are always accepted
    pub async fn validate_delete(&self, cluster: &ManagedCluster) -> Result<(), AdmissionError> {
        debug!("ManagedCluster {} delete accepted", cluster.name_any());
        Ok(())
    }
}
