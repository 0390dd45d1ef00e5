//! Retry policy for transient store responses.
//!
//! The transport consults a [`RetryFilter`] after every response. The
//! store-specific [`RetryPolicy`] evaluates, in order:
//!
//! 1. 500 on any verb: retry.
//! 2. 403 on a write: retry (pre-commit hooks reject writes while a node starts).
//! 3. 404 on a read that opted in: retry until the not-found cap is used up.
//! 4. A non-404 after an earlier 404: count the recovery and fall through.
//! 5. Otherwise: do not retry.
//!
//! The policy never bounds 500/403 retries itself; the transport's attempt
//! ceiling does.

use crate::observer::{Metric, Observer};
use riakc_protocol::{path_root, status, HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::warn;

/// Decides whether a response should be retried.
pub trait RetryFilter: Send + Sync {
    /// Returns true to re-issue the request. May update the request's retry state.
    fn should_retry(&self, request: &mut HttpRequest, response: &HttpResponse) -> bool;
}

/// A filter that never retries.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverRetry;

impl RetryFilter for NeverRetry {
    fn should_retry(&self, _request: &mut HttpRequest, _response: &HttpResponse) -> bool {
        false
    }
}

/// The store's retry decision table.
pub struct RetryPolicy {
    observer: Arc<dyn Observer>,
    not_found_retries: u32,
}

impl RetryPolicy {
    /// Creates a policy allowing one extra attempt after a not-found read.
    pub fn new(observer: Arc<dyn Observer>) -> Self {
        Self {
            observer,
            not_found_retries: 1,
        }
    }

    /// Sets how many extra attempts a not-found read gets.
    pub fn with_not_found_retries(mut self, retries: u32) -> Self {
        self.not_found_retries = retries;
        self
    }

    /// Returns the not-found cap.
    pub fn not_found_retries(&self) -> u32 {
        self.not_found_retries
    }

    fn counter(&self, key: String) {
        self.observer.on_metric(&Metric::counter(key));
    }
}

impl RetryFilter for RetryPolicy {
    fn should_retry(&self, request: &mut HttpRequest, response: &HttpResponse) -> bool {
        let state = &mut request.retry_state;
        state.attempts += 1;
        state.last_body_empty = response.body.is_empty();

        if response.status == status::INTERNAL_SERVER_ERROR {
            warn!(
                path = %request.path,
                "riak retry: retrying on 500 status: {}",
                response.body_text()
            );
            self.counter("riak_retry_filter|500".into());
            return true;
        }

        if request.method.is_write() && response.status == status::FORBIDDEN {
            warn!(path = %request.path, "riak retry: retrying {} on 403 status", request.method);
            self.counter(format!("riak_retry_filter|403_{}", request.method));
            return true;
        }

        if request.retry_not_found && request.method.is_read() && response.status == status::NOT_FOUND
        {
            state.not_found += 1;
            if state.not_found <= self.not_found_retries {
                self.counter("riak_retry_filter|404_GET".into());
                return true;
            }
            return false;
        }

        if state.not_found > 0 {
            self.counter(format!("riak_retry_recover|{}", path_root(&request.path)));
        }

        false
    }
}
