//! Integration tests for the Kubernetes-backed store
//!
//! These tests require a reachable cluster (current kubeconfig context).
//! They create and delete ConfigMaps in the `default` namespace.

use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use resource_store::{KubeStore, LabelSelector, ResourceStore};

fn test_config_map(name: &str) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            labels: Some([("resource-store-test".to_string(), "true".to_string())].into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
#[ignore] // Requires a running cluster
async fn test_get_missing_object_is_not_found() {
    let client = kube::Client::try_default().await.expect("Failed to create client");
    let store: KubeStore<ConfigMap> = KubeStore::new(client);

    let found = store.find("default", "resource-store-does-not-exist").await
        .expect("Lookup failed");
    assert!(found.is_none());
}

#[tokio::test]
#[ignore] // Requires a running cluster
async fn test_create_update_delete_round() {
    let client = kube::Client::try_default().await.expect("Failed to create client");
    let store: KubeStore<ConfigMap> = KubeStore::new(client);

    let created = store.create(&test_config_map("resource-store-it")).await
        .expect("Failed to create ConfigMap");

    let mut stale = created.clone();
    let mut fresh = created.clone();
    fresh.data = Some([("k".to_string(), "v".to_string())].into());
    store.update(&fresh).await.expect("Failed to update ConfigMap");

    // The first update consumed the version token
    stale.data = Some([("k".to_string(), "other".to_string())].into());
    let err = store.update(&stale).await.expect_err("Stale update must fail");
    assert!(err.is_conflict());

    let listed = store.list(Some("default"), &LabelSelector::eq("resource-store-test", "true")).await
        .expect("Failed to list ConfigMaps");
    assert!(!listed.is_empty());

    store.delete("default", "resource-store-it").await.expect("Failed to delete ConfigMap");
    let err = store.delete("default", "resource-store-it").await.expect_err("Second delete must fail");
    assert!(err.is_not_found());
}
