//! Unit tests for ManagedCluster admission rules

use crate::error::AdmissionError;
use crate::test_utils::*;
use crate::validator::SecretValidator;
use crds::constants::MULTI_CLUSTER_NAMESPACE;
use crds::SecretReference;
use k8s_openapi::api::core::v1::Secret;
use resource_store::{InjectedFailure, MockStore, StoreError, StoreOp};
use std::sync::Arc;

fn validation_message(result: Result<(), AdmissionError>) -> String {
    match result {
        Err(AdmissionError::Validation(msg)) => msg,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_rejects_unnamed_secret() {
    let secrets = MockStore::<Secret>::new();
    let validator = create_test_validator(&secrets);

    let msg = validation_message(validator.validate_create(&create_test_cluster("cluster1", "")).await);

    assert_eq!(msg, "the name of the Prometheus secret in namespace monitoring-mc must be specified");
    // Rejected without a lookup
    assert!(secrets.calls().is_empty());
}

#[tokio::test]
async fn test_create_rejects_missing_secret() {
    let secrets = MockStore::<Secret>::new();
    secrets.insert(create_test_secret("prometheus-cluster1", "default"));
    let validator = create_test_validator(&secrets);

    let msg = validation_message(
        validator
            .validate_create(&create_test_cluster("cluster1", "prometheus-cluster1"))
            .await,
    );

    assert_eq!(msg, "the Prometheus secret prometheus-cluster1 does not exist in namespace monitoring-mc");
}

#[tokio::test]
async fn test_create_accepts_existing_secret() {
    let secrets = MockStore::<Secret>::new();
    secrets.insert(create_test_secret("prometheus-cluster1", MULTI_CLUSTER_NAMESPACE));
    let validator = create_test_validator(&secrets);

    validator
        .validate_create(&create_test_cluster("cluster1", "prometheus-cluster1"))
        .await
        .unwrap();
    assert_eq!(secrets.call_count(StoreOp::Get), 1);
}

#[tokio::test]
async fn test_lookup_failure_is_a_store_error() {
    let secrets = MockStore::<Secret>::new();
    secrets.fail_all(StoreOp::Get, InjectedFailure::Unavailable("connection refused".to_string()));
    let validator = create_test_validator(&secrets);

    let err = validator
        .validate_create(&create_test_cluster("cluster1", "prometheus-cluster1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AdmissionError::Store(StoreError::Unavailable(_))));
}

#[tokio::test]
async fn test_update_applies_create_rule() {
    let secrets = MockStore::<Secret>::new();
    secrets.insert(create_test_secret("prometheus-cluster1", MULTI_CLUSTER_NAMESPACE));
    let validator = create_test_validator(&secrets);
    let old = create_test_cluster("cluster1", "prometheus-cluster1");

    validator
        .validate_update(Some(&old), &create_test_cluster("cluster1", "prometheus-cluster1"))
        .await
        .unwrap();

    let msg = validation_message(
        validator
            .validate_update(Some(&old), &create_test_cluster("cluster1", "prometheus-renamed"))
            .await,
    );
    assert_eq!(msg, "the Prometheus secret prometheus-renamed does not exist in namespace monitoring-mc");
}

#[tokio::test]
async fn test_delete_always_accepted() {
    let secrets = MockStore::<Secret>::new();
    secrets.fail_all(StoreOp::Get, InjectedFailure::Unavailable("connection refused".to_string()));
    let validator = create_test_validator(&secrets);

    validator
        .validate_delete(&create_test_cluster("cluster1", ""))
        .await
        .unwrap();
    assert!(secrets.calls().is_empty());
}

#[tokio::test]
async fn test_secret_validator_uses_kind_in_messages() {
    let secrets = MockStore::<Secret>::new();
    let validator = SecretValidator::new(Arc::new(secrets));

    let msg = validation_message(
        validator
            .validate("Grafana", &SecretReference::new("grafana-admin", "monitoring-system"))
            .await,
    );
    assert_eq!(msg, "the Grafana secret grafana-admin does not exist in namespace monitoring-system");

    let msg = validation_message(validator.validate("Grafana", &SecretReference::new("", "monitoring-system")).await);
    assert_eq!(msg, "the name of the Grafana secret in namespace monitoring-system must be specified");
}

#[tokio::test]
async fn test_whitespace_name_is_looked_up() {
    let secrets = MockStore::<Secret>::new();
    let validator = create_test_validator(&secrets);

    let msg = validation_message(validator.validate_create(&create_test_cluster("cluster1", " ")).await);

    assert_eq!(msg, "the Prometheus secret   does not exist in namespace monitoring-mc");
    assert_eq!(secrets.call_count(StoreOp::Get), 1);
}
