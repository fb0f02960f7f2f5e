//! Prometheus export for pipeline and HTTP metrics.

use astra::{Degraded, EmergencyReport, PipelineMetrics, TriageError};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

pub const STAGE_DURATION: &str = "astra_stage_duration_seconds";
pub const REPORTS_TOTAL: &str = "astra_reports_total";
pub const HTTP_REQUESTS_TOTAL: &str = "astra_http_requests_total";

const DURATION_BUCKETS: [f64; 12] = [
    0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 20.0, 30.0,
];

/// Install the global recorder. Fails if one is already installed.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Suffix("seconds".to_string()), &DURATION_BUCKETS)?
        .install_recorder()?;
    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_histogram!(
        STAGE_DURATION,
        "Latency of each triage stage, labelled by stage and outcome"
    );
    describe_counter!(
        REPORTS_TOTAL,
        "Reports produced, labelled by whether they collapsed to SPAM"
    );
    describe_counter!(HTTP_REQUESTS_TOTAL, "HTTP responses by status code");
}

/// Feeds pipeline observations into the `metrics` facade.
#[derive(Debug, Default)]
pub struct PrometheusPipelineMetrics;

fn degraded_outcome(degraded: Option<&Degraded>) -> &'static str {
    match degraded {
        None => "ok",
        Some(Degraded::Timeout) => "timeout",
        Some(Degraded::Inference(_)) => "inference_error",
        Some(Degraded::MissingText) => "missing_text",
        Some(Degraded::BlankReply) => "blank_reply",
    }
}

impl PipelineMetrics for PrometheusPipelineMetrics {
    fn record_fetch(&self, latency: Duration, result: Result<(), &TriageError>) {
        let outcome = match result {
            Ok(()) => "ok",
            Err(TriageError::Timeout { .. }) => "timeout",
            Err(_) => "error",
        };
        histogram!(STAGE_DURATION, "stage" => "fetching", "outcome" => outcome)
            .record(latency.as_secs_f64());
    }

    fn record_describe(&self, latency: Duration, degraded: Option<&Degraded>) {
        histogram!(STAGE_DURATION, "stage" => "describing", "outcome" => degraded_outcome(degraded))
            .record(latency.as_secs_f64());
    }

    fn record_classify(&self, latency: Duration, degraded: Option<&Degraded>) {
        histogram!(STAGE_DURATION, "stage" => "classifying", "outcome" => degraded_outcome(degraded))
            .record(latency.as_secs_f64());
    }

    fn record_report(&self, latency: Duration, report: &EmergencyReport) {
        let outcome = if report.is_spam() { "spam" } else { "report" };
        histogram!(STAGE_DURATION, "stage" => "total", "outcome" => outcome)
            .record(latency.as_secs_f64());
        counter!(REPORTS_TOTAL, "outcome" => outcome).increment(1);
    }
}
