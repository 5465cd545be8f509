//! Pipeline metrics recorded through the `metrics` facade.
//!
//! Nothing is exported unless a recorder is installed; `serve` installs the
//! Prometheus exporter when `PIPELINE_METRICS_PORT` is set.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

/// All metric names used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    StageRuns,
    StageFailures,
    StageDuration,
    RecordsWritten,
    RegistryRejections,
    EnrichmentFailures,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::StageRuns => "pipeline_stage_runs_total",
            MetricName::StageFailures => "pipeline_stage_failures_total",
            MetricName::StageDuration => "pipeline_stage_duration_seconds",
            MetricName::RecordsWritten => "pipeline_records_written_total",
            MetricName::RegistryRejections => "pipeline_registry_rejections_total",
            MetricName::EnrichmentFailures => "pipeline_enrichment_failures_total",
        }
    }
}

/// Install the Prometheus exporter if `PIPELINE_METRICS_PORT` is set.
pub fn init_metrics() {
    let Some(port) = std::env::var("PIPELINE_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
    else {
        return;
    };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    match metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        Ok(()) => info!("Prometheus exporter listening on http://{}/metrics", addr),
        Err(e) => warn!("Prometheus exporter install failed: {}", e),
    }
}

pub fn stage_started(stage: &'static str) {
    ::metrics::counter!(MetricName::StageRuns.as_str(), "stage" => stage).increment(1);
}

pub fn stage_finished(stage: &'static str, records: usize, elapsed: Duration) {
    ::metrics::counter!(MetricName::RecordsWritten.as_str(), "stage" => stage)
        .increment(records as u64);
    ::metrics::histogram!(MetricName::StageDuration.as_str(), "stage" => stage)
        .record(elapsed.as_secs_f64());
}

pub fn stage_failed(stage: &'static str) {
    ::metrics::counter!(MetricName::StageFailures.as_str(), "stage" => stage).increment(1);
}

/// `reason` is the HTTP status, or "transport" when no response arrived.
pub fn registry_rejected(reason: &str) {
    ::metrics::counter!(MetricName::RegistryRejections.as_str(), "reason" => reason.to_string())
        .increment(1);
}

pub fn enrichment_failed(kind: &'static str) {
    ::metrics::counter!(MetricName::EnrichmentFailures.as_str(), "kind" => kind).increment(1);
}
