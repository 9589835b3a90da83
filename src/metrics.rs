use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and describe our series.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "feedback_analyses_total",
            "Comments that went through the full pipeline."
        );
        describe_counter!(
            "feedback_invalid_inputs_total",
            "Comments rejected before analysis (empty / non-string / no language model)."
        );
        describe_counter!(
            "feedback_segmented_total",
            "Comments split into two or more language segments."
        );
        describe_counter!(
            "feedback_stage_failures_total",
            "Classifier or extractor failures degraded to sentinel values, by stage."
        );
        describe_counter!(
            "feedback_store_failures_total",
            "Analysis results the store failed to persist."
        );
        describe_histogram!("feedback_analysis_ms", "Single-comment analysis time in milliseconds.");
    });
}

// No-ops unless a recorder is installed (tests run without one).

pub fn record_analysis(elapsed_ms: f64, segmented: bool) {
    counter!("feedback_analyses_total").increment(1);
    if segmented {
        counter!("feedback_segmented_total").increment(1);
    }
    histogram!("feedback_analysis_ms").record(elapsed_ms);
}

pub fn record_invalid_input() {
    counter!("feedback_invalid_inputs_total").increment(1);
}

pub fn record_stage_failure(stage: &'static str) {
    counter!("feedback_stage_failures_total", "stage" => stage).increment(1);
}

pub fn record_store_failure() {
    counter!("feedback_store_failures_total").increment(1);
}
