//! Client and per-operation configuration.

use crate::error::{ClientError, ClientResult};
use crate::resolver::{ResolutionHandle, Resolver, SiblingSet};
use riakc_protocol::{Encoding, Headers, Query};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a [`RiakClient`](crate::RiakClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Store nodes as `host:port`.
    pub nodes: Vec<String>,
    /// Client identifier sent with every request.
    pub client_id: String,
    /// Pool name used in metric keys.
    pub pool_name: String,
    /// First path segment of object URLs.
    pub namespace: String,
    /// Transport retry and backoff.
    pub retry: RetryConfig,
    /// Extra attempts allowed after a not-found read.
    pub not_found_retries: u32,
    /// Requests slower than this are logged.
    pub slow_request_threshold: Duration,
    /// Deliver resolved siblings before their write-back completes.
    pub detach_resolved_writes: bool,
    /// Trace every request and response at debug level.
    pub debug: bool,
}

impl ClientConfig {
    /// Creates a new client configuration.
    pub fn new(nodes: Vec<String>, client_id: impl Into<String>) -> Self {
        Self {
            nodes,
            client_id: client_id.into(),
            pool_name: "riak_user".into(),
            namespace: "riak".into(),
            retry: RetryConfig::default(),
            not_found_retries: 1,
            slow_request_threshold: Duration::from_millis(300),
            detach_resolved_writes: false,
            debug: false,
        }
    }

    /// Creates a configuration with a random client identifier.
    pub fn with_random_client_id(nodes: Vec<String>) -> Self {
        Self::new(nodes, uuid::Uuid::new_v4().to_string())
    }

    /// Sets the pool name.
    pub fn with_pool_name(mut self, name: impl Into<String>) -> Self {
        self.pool_name = name.into();
        self
    }

    /// Sets the object namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets how many extra attempts a not-found read gets.
    pub fn with_not_found_retries(mut self, retries: u32) -> Self {
        self.not_found_retries = retries;
        self
    }

    /// Sets the slow request threshold.
    pub fn with_slow_request_threshold(mut self, threshold: Duration) -> Self {
        self.slow_request_threshold = threshold;
        self
    }

    /// Delivers resolved siblings without waiting for the write-back.
    pub fn with_detached_resolved_writes(mut self, detach: bool) -> Self {
        self.detach_resolved_writes = detach;
        self
    }

    /// Enables debug tracing.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Checks the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        if self.client_id.is_empty() {
            return Err(ClientError::configuration("client_id must be specified"));
        }
        if self.nodes.is_empty() {
            return Err(ClientError::configuration("at least one node is required"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ClientError::configuration("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }
}

/// Attempt ceiling and backoff schedule for the pooled transport.
///
/// The retry policy decides whether a response is worth another attempt;
/// this decides how many attempts there are and how long to wait between them.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts per request, the first one included.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on any single wait.
    pub max_delay: Duration,
    /// Growth factor applied to the wait after each attempt.
    pub backoff_multiplier: f64,
    /// Spread waits randomly so clients hitting one node do not retry in step.
    pub add_jitter: bool,
}

impl RetryConfig {
    /// `max_attempts` attempts, 20ms first wait doubling up to 2s, with jitter.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }

    /// A single attempt and no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            add_jitter: false,
        }
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enables or disables jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.add_jitter = jitter;
        self
    }

    /// Wait before attempt number `attempt`, counting from zero.
    ///
    /// The first attempt never waits.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let wait = (self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent))
            .min(self.max_delay.as_secs_f64());
        let spread = if self.add_jitter {
            wait * 0.25 * rand::random::<f64>()
        } else {
            0.0
        };
        Duration::from_secs_f64(wait + spread)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Options for a single object-level operation.
#[derive(Clone)]
pub struct RequestOptions {
    /// Read quorum.
    pub r: Option<u32>,
    /// Write quorum.
    pub w: Option<u32>,
    /// Ask for the stored body on writes (200 instead of 204).
    pub return_body: bool,
    /// Retry a not-found read once before believing it.
    pub retry_on_not_found: bool,
    /// Body encoding.
    pub encoding: Encoding,
    /// Sibling resolver; required whenever siblings are possible.
    pub resolver: Option<Resolver>,
    /// Extra request headers (index headers, content type, links).
    pub headers: Headers,
}

impl RequestOptions {
    /// Default options: JSON encoding, not-found retry on, no resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read quorum.
    pub fn with_r(mut self, r: u32) -> Self {
        self.r = Some(r);
        self
    }

    /// Sets the write quorum.
    pub fn with_w(mut self, w: u32) -> Self {
        self.w = Some(w);
        self
    }

    /// Sets the return-body flag.
    pub fn with_return_body(mut self, return_body: bool) -> Self {
        self.return_body = return_body;
        self
    }

    /// Sets whether not-found reads are retried.
    pub fn with_retry_on_not_found(mut self, retry: bool) -> Self {
        self.retry_on_not_found = retry;
        self
    }

    /// Sets the body encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Stores bodies as-is instead of JSON.
    pub fn raw(self) -> Self {
        self.with_encoding(Encoding::Raw)
    }

    /// Sets the sibling resolver.
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(SiblingSet, ResolutionHandle) + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Adds a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The query string these options produce.
    pub fn query(&self) -> Query {
        Query {
            r: self.r,
            w: self.w,
            return_body: self.return_body,
        }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            r: None,
            w: None,
            return_body: false,
            retry_on_not_found: true,
            encoding: Encoding::Json,
            resolver: None,
            headers: Headers::new(),
        }
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("r", &self.r)
            .field("w", &self.w)
            .field("return_body", &self.return_body)
            .field("retry_on_not_found", &self.retry_on_not_found)
            .field("encoding", &self.encoding)
            .field("has_resolver", &self.resolver.is_some())
            .field("headers", &self.headers)
            .finish()
    }
}
