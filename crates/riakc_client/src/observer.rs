//! Observability capability injected into the client.
//!
//! Metrics, pool health changes and transport retries are reported through an
//! [`Observer`]. Nothing in the client depends on what an observer does with
//! them.

use std::fmt;
use tracing::{debug, info, warn};

/// Kind of metric sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonic counter increment.
    Counter,
    /// Distribution sample (durations in milliseconds).
    Histogram,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Counter => f.write_str("counter"),
            MetricKind::Histogram => f.write_str("histogram"),
        }
    }
}

/// One metric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Sample kind.
    pub kind: MetricKind,
    /// Metric key, e.g. `riak_retry_filter|500`.
    pub key: String,
    /// Sample value.
    pub value: f64,
}

impl Metric {
    /// A counter increment of one.
    pub fn counter(key: impl Into<String>) -> Self {
        Self {
            kind: MetricKind::Counter,
            key: key.into(),
            value: 1.0,
        }
    }

    /// A histogram sample.
    pub fn histogram(key: impl Into<String>, value: f64) -> Self {
        Self {
            kind: MetricKind::Histogram,
            key: key.into(),
            value,
        }
    }
}

/// A node changed health state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthEvent {
    /// The node address.
    pub node: String,
    /// Whether the node is now considered healthy.
    pub healthy: bool,
}

/// Why the transport re-issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// The retry filter asked for another attempt.
    Filter,
    /// The previous attempt failed at the network level.
    Transport,
}

impl RetryReason {
    /// Label used in metric keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryReason::Filter => "filter",
            RetryReason::Transport => "transport",
        }
    }
}

/// The transport is about to re-issue a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryEvent {
    /// Node the failed attempt went to.
    pub node: String,
    /// Request path.
    pub path: String,
    /// Why it is retried.
    pub reason: RetryReason,
    /// Human-readable detail.
    pub message: String,
    /// Attempt number that is about to start (1-based retries).
    pub attempt: u32,
}

/// Receives observability events from the client.
///
/// All methods default to doing nothing.
pub trait Observer: Send + Sync {
    /// A metric sample was produced.
    fn on_metric(&self, _metric: &Metric) {}

    /// A node changed health state.
    fn on_health_change(&self, _event: &HealthEvent) {}

    /// The transport is retrying a request.
    fn on_retry(&self, _event: &RetryEvent) {}
}

/// An observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// An observer that forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_metric(&self, metric: &Metric) {
        debug!(kind = %metric.kind, key = %metric.key, value = metric.value, "metric");
    }

    fn on_health_change(&self, event: &HealthEvent) {
        info!(node = %event.node, healthy = event.healthy, "riak pool health");
    }

    fn on_retry(&self, event: &RetryEvent) {
        if event.reason != RetryReason::Filter {
            warn!(
                node = %event.node,
                path = %event.path,
                attempt = event.attempt,
                "riak retry: {}",
                event.message
            );
        }
    }
}
