//! Prometheus metrics for the social graph handlers.
//!
//! All metrics follow the naming convention: `sg_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================

    /// Notification upserts that reached the store
    pub static ref NOTIFICATIONS_UPSERTED: CounterVec = CounterVec::new(
        Opts::new("sg_notifications_upserted_total", "Notification documents upserted by key"),
        &["kind"]  // new_post, follow, follow_request, follow_request_accepted, follow_request_declined
    ).expect("metric creation failed");

    /// Best-effort notification writes that failed and were swallowed
    pub static ref NOTIFICATION_FAILURES_SWALLOWED: CounterVec = CounterVec::new(
        Opts::new(
            "sg_notifications_failures_swallowed_total",
            "Best-effort notification writes that failed without failing the caller"
        ),
        &["kind"]
    ).expect("metric creation failed");

    // =========================================================================
    // FANOUT
    // =========================================================================

    /// Fanout chunks by outcome
    pub static ref FANOUT_CHUNKS: CounterVec = CounterVec::new(
        Opts::new("sg_fanout_chunks_total", "Post fanout chunks by outcome"),
        &["outcome"]  // committed, failed
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Transaction commits retried after contention, and abandoned transactions
    pub static ref TRANSACTION_RETRIES: CounterVec = CounterVec::new(
        Opts::new("sg_transaction_retries_total", "Optimistic transaction retries"),
        &["outcome"]  // retried, abandoned
    ).expect("metric creation failed");

    // =========================================================================
    // FOLLOW REQUESTS
    // =========================================================================

    /// Follow request state transitions
    pub static ref FOLLOW_TRANSITIONS: CounterVec = CounterVec::new(
        Opts::new("sg_follow_transitions_total", "Follow request transitions by outcome"),
        &["transition"]  // requested, cancelled, accepted, declined, ignored, instant
    ).expect("metric creation failed");

    // =========================================================================
    // TRIGGER HANDLERS
    // =========================================================================

    /// Handler invocations by handler and outcome
    pub static ref HANDLER_INVOCATIONS: CounterVec = CounterVec::new(
        Opts::new("sg_handler_invocations_total", "Trigger handler invocations"),
        &["handler", "outcome"]  // outcome: ok, failed, redelivered, dead_lettered, rejected
    ).expect("metric creation failed");

    /// Handler duration histogram
    pub static ref HANDLER_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sg_handler_duration_seconds",
            "Time spent in a single trigger handler invocation"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).unwrap_or_default())
    ).expect("metric creation failed");
}

/// Handle to the metrics registry.
#[derive(Clone)]
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Registering twice in one process is not an error; the second call returns
/// a handle to the same registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Notifications
        Box::new(NOTIFICATIONS_UPSERTED.clone()),
        Box::new(NOTIFICATION_FAILURES_SWALLOWED.clone()),
        // Fanout
        Box::new(FANOUT_CHUNKS.clone()),
        // Transactions
        Box::new(TRANSACTION_RETRIES.clone()),
        // Follow requests
        Box::new(FOLLOW_TRANSITIONS.clone()),
        // Handlers
        Box::new(HANDLER_INVOCATIONS.clone()),
        Box::new(HANDLER_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
