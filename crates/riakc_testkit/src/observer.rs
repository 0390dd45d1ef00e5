//! Observer that records everything it sees.

use parking_lot::Mutex;
use riakc_client::{HealthEvent, Metric, MetricKind, Observer, RetryEvent};

/// Keeps every observer event for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    metrics: Mutex<Vec<Metric>>,
    health: Mutex<Vec<HealthEvent>>,
    retries: Mutex<Vec<RetryEvent>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All metric samples, in order.
    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics.lock().clone()
    }

    /// Number of counter increments recorded under `key`.
    pub fn counter(&self, key: &str) -> usize {
        self.metrics
            .lock()
            .iter()
            .filter(|m| m.kind == MetricKind::Counter && m.key == key)
            .count()
    }

    /// Histogram samples whose key starts with `prefix`.
    pub fn histograms(&self, prefix: &str) -> Vec<Metric> {
        self.metrics
            .lock()
            .iter()
            .filter(|m| m.kind == MetricKind::Histogram && m.key.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// All health changes, in order.
    pub fn health_changes(&self) -> Vec<HealthEvent> {
        self.health.lock().clone()
    }

    /// All retry events, in order.
    pub fn retries(&self) -> Vec<RetryEvent> {
        self.retries.lock().clone()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.metrics.lock().clear();
        self.health.lock().clear();
        self.retries.lock().clear();
    }
}

impl Observer for RecordingObserver {
    fn on_metric(&self, metric: &Metric) {
        self.metrics.lock().push(metric.clone());
    }

    fn on_health_change(&self, event: &HealthEvent) {
        self.health.lock().push(event.clone());
    }

    fn on_retry(&self, event: &RetryEvent) {
        self.retries.lock().push(event.clone());
    }
}
