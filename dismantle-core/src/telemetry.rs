//! Metrics emitted by the engine when the `metrics` feature is enabled.

use std::time::Duration;

#[cfg(feature = "metrics")]
pub(crate) fn record_accepted() {
    metrics::counter!("dismantle_candidates_accepted").increment(1);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_accepted() {}

#[cfg(feature = "metrics")]
pub(crate) fn record_rejected() {
    metrics::counter!("dismantle_candidates_rejected").increment(1);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_rejected() {}

#[cfg(feature = "metrics")]
pub(crate) fn record_early_stop() {
    metrics::counter!("dismantle_early_stops").increment(1);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_early_stop() {}

#[cfg(feature = "metrics")]
pub(crate) fn record_connectivity_latency(elapsed: Duration) {
    metrics::histogram!("dismantle_connectivity_latency_seconds").record(elapsed.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_connectivity_latency(_elapsed: Duration) {}
