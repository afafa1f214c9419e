//! Prometheus textfile output.
//!
//! The orchestrator is a one-shot job, so metrics are written to a file in
//! the text exposition format instead of being served.

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntGauge, Registry, TextEncoder};

/// Registry holding the core collectors plus run-level gauges.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// 1 if every workflow passed, 0 otherwise.
pub static RUN_SUCCEEDED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "ocmts_run_succeeded",
        "Whether the last orchestration passed (1) or failed (0)",
    )
    .unwrap()
});

/// Unix time the run finished.
pub static RUN_FINISHED_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "ocmts_run_finished_timestamp_seconds",
        "Unix timestamp of the end of the last orchestration",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    for metric in ocmts_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
    registry.register(Box::new(RUN_SUCCEEDED.clone())).unwrap();
    registry
        .register(Box::new(RUN_FINISHED_TIMESTAMP.clone()))
        .unwrap();
}

/// Encode all metrics in Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

/// Record the verdict and write the textfile.
pub fn write_textfile(path: &Path, all_succeeded: bool) -> Result<()> {
    RUN_SUCCEEDED.set(i64::from(all_succeeded));
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();
    RUN_FINISHED_TIMESTAMP.set(now);

    let text = encode_metrics()?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write metrics to {}", path.display()))
}
