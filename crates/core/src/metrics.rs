//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Dispatcher (dispatch results, run lookups)
//! - Poller (transient status errors, poll timeouts)
//! - Scheduler (per-workflow results and durations, batches)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Dispatcher
// =============================================================================

/// Workflow dispatches by result.
pub static DISPATCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ocmts_workflow_dispatches_total", "Total workflow dispatch requests"),
        &["result"], // "ok", "error"
    )
    .unwrap()
});

/// Dispatched workflows whose run was never observed.
pub static RUN_LOOKUP_TIMEOUTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ocmts_run_lookup_timeouts_total",
        "Dispatched workflows with no in-progress run found in time",
    )
    .unwrap()
});

// =============================================================================
// Poller
// =============================================================================

/// Failed run status fetches (retried).
pub static POLL_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ocmts_poll_errors_total",
        "Transient errors while fetching run status",
    )
    .unwrap()
});

/// Runs abandoned because they exceeded the maximum poll duration.
pub static POLL_TIMEOUTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ocmts_poll_timeouts_total",
        "Runs that did not complete within the maximum poll duration",
    )
    .unwrap()
});

// =============================================================================
// Scheduler
// =============================================================================

/// Finished workflows by report status.
pub static WORKFLOW_RESULTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ocmts_workflow_results_total", "Finished workflows by status"),
        &["status"], // "success", "allowed-failure", "failure"
    )
    .unwrap()
});

/// Wall time from dispatch to result, in seconds.
pub static WORKFLOW_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "ocmts_workflow_duration_seconds",
            "Time from dispatch to final result",
        )
        .buckets(vec![
            30.0, 60.0, 120.0, 300.0, 600.0, 900.0, 1800.0, 3600.0, 7200.0,
        ]),
        &["status"],
    )
    .unwrap()
});

/// Batches processed.
pub static BATCHES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("ocmts_batches_total", "Workflow batches processed").unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(DISPATCHES.clone()),
        Box::new(RUN_LOOKUP_TIMEOUTS.clone()),
        Box::new(POLL_ERRORS.clone()),
        Box::new(POLL_TIMEOUTS.clone()),
        Box::new(WORKFLOW_RESULTS.clone()),
        Box::new(WORKFLOW_DURATION.clone()),
        Box::new(BATCHES.clone()),
    ]
}
