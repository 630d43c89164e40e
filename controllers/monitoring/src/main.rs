//! Monitoring Controller
//!
//! Keeps one MonitoringInstance in sync with each Binding:
//! - creates the instance the first time a Binding is seen
//! - updates it when its desired spec differs, keeping storage claims
//! - deletes it (through a finalizer) when the Binding is removed

mod backoff;
mod config;
mod controller;
mod diff;
mod error;
mod metrics;
mod reconciler;
mod spec_builder;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::{debug, info};

fn init_tracing() {
    // RUST_LOG selects levels (default info), RUST_LOG_FORMAT=json switches to JSON lines
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .compact()
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    // kube's rustls client needs a process-wide crypto provider
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    init_tracing();

    info!("Starting Monitoring Controller");

    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Platform URI: {}", config.settings.platform_uri);
    info!("  Monitoring storage: {}", if config.settings.storage_enabled { "enabled" } else { "disabled" });
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Metrics address: {}", config.metrics_addr);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
