//! Prometheus metrics for the Monitoring Controller.
//!
//! All metrics share the `monitoring_microscaler_io` prefix and live in a
//! registry owned by [`Metrics`], served on `/metrics`.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Namespace prefix for all metrics (prometheus-safe form of the API group)
const METRICS_NAMESPACE: &str = "monitoring_microscaler_io";

/// Controller metrics and the registry they are registered in
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    /// Successful reconciles by outcome (`created`, `updated`, `unchanged`)
    reconciliations: IntCounterVec,
    /// Failed reconciles and cleanups by error kind
    errors: IntCounterVec,
    /// Reconcile duration in seconds
    duration: HistogramVec,
    /// MonitoringInstances removed by garbage collection
    instances_deleted: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let reconciliations = IntCounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_reconciliations_total"),
                "Total number of successful Binding reconciliations by outcome",
            ),
            &["outcome"],
        )?;
        let errors = IntCounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_errors_total"),
                "Total number of failed Binding reconciliations and cleanups by error kind",
            ),
            &["kind"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
                "Duration of Binding reconciliations in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
            &["phase"],
        )?;
        let instances_deleted = IntCounter::new(
            format!("{METRICS_NAMESPACE}_instances_deleted_total"),
            "Total number of MonitoringInstances deleted by garbage collection",
        )?;

        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(errors.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(instances_deleted.clone()))?;

        Ok(Self {
            registry,
            reconciliations,
            errors,
            duration,
            instances_deleted,
        })
    }

    pub fn record_reconcile(&self, outcome: &str, elapsed: Duration) {
        self.reconciliations.with_label_values(&[outcome]).inc();
        self.duration.with_label_values(&["apply"]).observe(elapsed.as_secs_f64());
    }

    pub fn record_cleanup(&self, deleted: usize, elapsed: Duration) {
        self.instances_deleted.inc_by(deleted as u64);
        self.duration.with_label_values(&["cleanup"]).observe(elapsed.as_secs_f64());
    }

    pub fn record_error(&self, kind: &str) {
        self.errors.with_label_values(&[kind]).inc();
    }

    /// Render the registry in the Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
    }
}
