//! Main controller implementation.
//!
//! Wires the Kubernetes client, the MonitoringInstance store and the
//! reconciler together, then runs the Binding watcher next to the
//! metrics/probe server.

use crate::backoff::BackoffTracker;
use crate::config::{ChartSettings, ControllerConfig};
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::reconciler::Reconciler;
use crate::spec_builder::DefaultSpecBuilder;
use crate::watcher::{watch_bindings, Context};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use crds::constants::SYSTEM_NAMESPACE;
use crds::{Binding, MonitoringInstance};
use helm_client::{HelmClient, PackageInstaller};
use kube::{Api, Client};
use resource_store::KubeStore;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Main controller for Binding reconciliation.
pub struct Controller {
    context: Arc<Context>,
    bindings: Api<Binding>,
    instances: Api<MonitoringInstance>,
    metrics_addr: SocketAddr,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Monitoring Controller");

        let client = Client::try_default().await?;

        if let Some(chart) = &config.chart {
            // A failed chart upgrade does not stop reconciliation
            if let Err(e) = sync_chart(&HelmClient::new(), chart).await {
                warn!("Chart upgrade for release {} failed (will continue): {}", chart.release, e);
            }
        }

        let instance_store: KubeStore<MonitoringInstance> = KubeStore::new(client.clone());
        let reconciler = Reconciler::new(
            Arc::new(instance_store),
            Box::new(DefaultSpecBuilder::new(config.settings)),
        );

        let bindings: Api<Binding> = match config.namespace.as_deref() {
            Some(ns) => Api::namespaced(client.clone(), ns),
            None => Api::all(client.clone()),
        };

        let instances: Api<MonitoringInstance> = Api::namespaced(client.clone(), SYSTEM_NAMESPACE);

        Ok(Self {
            context: Arc::new(Context {
                client,
                reconciler,
                metrics: Metrics::new()?,
                backoff: BackoffTracker::new(),
            }),
            bindings,
            instances,
            metrics_addr: config.metrics_addr,
        })
    }

    /// Runs the watcher and the metrics server until either stops
    pub async fn run(self) -> Result<(), ControllerError> {
        let listener = TcpListener::bind(self.metrics_addr).await?;
        info!("Serving metrics and probes on {}", self.metrics_addr);
        let app = router(self.context.metrics.clone());

        tokio::select! {
            result = watch_bindings(self.bindings, self.instances, self.context) => {
                if let Err(e) = &result {
                    error!("Binding watcher stopped: {}", e);
                }
                result
            }
            result = axum::serve(listener, app).into_future() => {
                error!("Metrics server stopped");
                result.map_err(ControllerError::from)
            }
        }
    }
}

/// Upgrade the operator chart if its release is installed
///
/// Returns whether an upgrade ran.
pub(crate) async fn sync_chart(
    installer: &dyn PackageInstaller,
    chart: &ChartSettings,
) -> Result<bool, ControllerError> {
    if !installer.is_installed(&chart.release, &chart.namespace).await? {
        warn!(
            "Release {} is not installed in namespace {}, skipping chart upgrade",
            chart.release, chart.namespace
        );
        return Ok(false);
    }

    info!("Upgrading release {} from {}", chart.release, chart.chart_dir);
    installer
        .upgrade(
            &chart.release,
            &chart.namespace,
            &chart.chart_dir,
            chart.overrides_file.as_deref(),
        )
        .await?;
    Ok(true)
}

/// Router serving `/metrics` and `/healthz`
pub(crate) fn router(metrics: Metrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<Metrics>) -> Response {
    match metrics.gather() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to gather metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}
