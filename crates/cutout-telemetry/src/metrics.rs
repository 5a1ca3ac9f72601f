//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters and gauges relevant to the background removal pipeline.

use std::sync::Arc;
use std::time::Duration;

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use serde::Serialize;

use crate::error::{TelemetryError, TelemetryResult};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    pipeline_outcomes_total: IntCounterVec,
    transform_duration_seconds: Histogram,
    inflight_pipelines: IntGauge,
}

/// Snapshot of selected gauges for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Number of pipeline runs currently in flight.
    pub inflight_pipelines: i64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> TelemetryResult<Self> {
        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )
        .map_err(TelemetryError::registration)?;
        let pipeline_outcomes_total = IntCounterVec::new(
            Opts::new(
                "pipeline_outcomes_total",
                "Background removal pipeline runs by outcome",
            ),
            &["outcome"],
        )
        .map_err(TelemetryError::registration)?;
        let transform_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "transform_duration_seconds",
            "Wall-clock duration of successful background removal runs",
        ))
        .map_err(TelemetryError::registration)?;
        let inflight_pipelines = IntGauge::with_opts(Opts::new(
            "inflight_pipelines",
            "Pipeline runs currently in flight",
        ))
        .map_err(TelemetryError::registration)?;

        let registry = Registry::new();
        registry
            .register(Box::new(http_requests_total.clone()))
            .map_err(TelemetryError::registration)?;
        registry
            .register(Box::new(pipeline_outcomes_total.clone()))
            .map_err(TelemetryError::registration)?;
        registry
            .register(Box::new(transform_duration_seconds.clone()))
            .map_err(TelemetryError::registration)?;
        registry
            .register(Box::new(inflight_pipelines.clone()))
            .map_err(TelemetryError::registration)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                pipeline_outcomes_total,
                transform_duration_seconds,
                inflight_pipelines,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Increment the pipeline outcome counter for the given outcome label.
    pub fn inc_pipeline_outcome(&self, outcome: &str) {
        self.inner
            .pipeline_outcomes_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Record the wall-clock duration of a completed transform.
    pub fn observe_transform_duration(&self, duration: Duration) {
        self.inner
            .transform_duration_seconds
            .observe(duration.as_secs_f64());
    }

    /// Mark a pipeline run as started.
    pub fn pipeline_started(&self) {
        self.inner.inflight_pipelines.inc();
    }

    /// Mark a pipeline run as finished.
    pub fn pipeline_finished(&self) {
        self.inner.inflight_pipelines.dec();
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(TelemetryError::encode)?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the most relevant gauges.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inflight_pipelines: self.inner.inflight_pipelines.get(),
        }
    }
}
