//! ManagedCluster Admission Webhook
//!
//! Validating webhook that refuses a ManagedCluster whose Prometheus
//! secret is unnamed or missing from the multi-cluster namespace.

mod config;
mod error;
mod validator;
mod webhook;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod validator_test;

use crate::config::WebhookConfig;
use crate::error::AdmissionError;
use crate::validator::{AdmissionValidator, SecretValidator};
use axum_server::tls_rustls::RustlsConfig;
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use resource_store::KubeStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .compact()
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AdmissionError> {
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    init_tracing();

    info!("Starting ManagedCluster admission webhook");

    let config = WebhookConfig::from_env()?;
    let client = Client::try_default().await?;
    let secrets: KubeStore<Secret> = KubeStore::new(client);
    let validator = AdmissionValidator::new(SecretValidator::new(Arc::new(secrets)));
    let app = webhook::router(Arc::new(validator));

    match config.tls {
        Some(tls) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls.cert_file, &tls.key_file).await?;
            info!("Serving admission reviews on https://{}", config.addr);
            axum_server::bind_rustls(config.addr, rustls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            warn!("TLS_CERT_FILE/TLS_KEY_FILE not set, serving plain HTTP");
            info!("Serving admission reviews on http://{}", config.addr);
            let listener = tokio::net::TcpListener::bind(config.addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
