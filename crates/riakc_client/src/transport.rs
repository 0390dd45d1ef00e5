//! Transport layer.
//!
//! [`HttpClient`] moves one request to one node and back. [`Transport`] is what
//! the rest of the client talks to: it owns node selection, the retry loop and
//! backoff, and consults a [`RetryFilter`] after every response.
//! [`PooledTransport`] is the stock implementation over any `HttpClient`.

use crate::config::RetryConfig;
use crate::error::{ClientError, ClientResult};
use crate::observer::{HealthEvent, Metric, Observer, RetryEvent, RetryReason};
use crate::retry::RetryFilter;
use async_trait::async_trait;
use riakc_protocol::{path_root, HttpRequest, HttpResponse, Method};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// HTTP client abstraction.
///
/// Implement this trait to plug in the actual HTTP library. One call is one
/// attempt against one node; retries happen above this layer.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a request to `node` (`host:port`) and returns the response.
    async fn send(&self, node: &str, request: &HttpRequest) -> Result<HttpResponse, String>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn send(&self, node: &str, request: &HttpRequest) -> Result<HttpResponse, String> {
        (**self).send(node, request).await
    }
}

/// Request transport with retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a request, re-issuing it while `filter` asks for a retry.
    ///
    /// When attempts run out the last response is returned as-is.
    async fn execute(
        &self,
        request: HttpRequest,
        filter: &dyn RetryFilter,
    ) -> ClientResult<HttpResponse>;

    /// Issues a GET.
    async fn get(
        &self,
        mut request: HttpRequest,
        filter: &dyn RetryFilter,
    ) -> ClientResult<HttpResponse> {
        request.method = Method::Get;
        self.execute(request, filter).await
    }

    /// Issues a PUT.
    async fn put(
        &self,
        mut request: HttpRequest,
        filter: &dyn RetryFilter,
    ) -> ClientResult<HttpResponse> {
        request.method = Method::Put;
        self.execute(request, filter).await
    }

    /// Issues a POST.
    async fn post(
        &self,
        mut request: HttpRequest,
        filter: &dyn RetryFilter,
    ) -> ClientResult<HttpResponse> {
        request.method = Method::Post;
        self.execute(request, filter).await
    }

    /// Issues a DELETE.
    async fn delete(
        &self,
        mut request: HttpRequest,
        filter: &dyn RetryFilter,
    ) -> ClientResult<HttpResponse> {
        request.method = Method::Delete;
        self.execute(request, filter).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(
        &self,
        request: HttpRequest,
        filter: &dyn RetryFilter,
    ) -> ClientResult<HttpResponse> {
        (**self).execute(request, filter).await
    }
}

struct Node {
    addr: String,
    healthy: AtomicBool,
}

/// Round-robin transport over a list of nodes.
///
/// Nodes are marked unhealthy when an attempt fails at the network level and
/// healthy again when they answer. Unhealthy nodes are skipped while at least
/// one healthy node remains.
pub struct PooledTransport<C: HttpClient> {
    client: C,
    nodes: Vec<Node>,
    next: AtomicUsize,
    retry: RetryConfig,
    pool_name: String,
    slow_threshold: Duration,
    observer: Arc<dyn Observer>,
}

impl<C: HttpClient> PooledTransport<C> {
    /// Creates a transport over `nodes`.
    pub fn new(
        client: C,
        nodes: Vec<String>,
        retry: RetryConfig,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            client,
            nodes: nodes
                .into_iter()
                .map(|addr| Node {
                    addr,
                    healthy: AtomicBool::new(true),
                })
                .collect(),
            next: AtomicUsize::new(0),
            retry,
            pool_name: "riak_user".into(),
            slow_threshold: Duration::from_millis(300),
            observer,
        }
    }

    /// Sets the pool name used in metric keys.
    pub fn with_pool_name(mut self, name: impl Into<String>) -> Self {
        self.pool_name = name.into();
        self
    }

    /// Sets the slow request threshold.
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Returns the underlying HTTP client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Addresses of the nodes currently considered healthy.
    pub fn healthy_nodes(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.healthy.load(Ordering::SeqCst))
            .map(|n| n.addr.clone())
            .collect()
    }

    fn pick_node(&self) -> Option<&Node> {
        if self.nodes.is_empty() {
            return None;
        }
        let start = self.next.fetch_add(1, Ordering::Relaxed);
        let len = self.nodes.len();
        (0..len)
            .map(|offset| &self.nodes[(start + offset) % len])
            .find(|n| n.healthy.load(Ordering::SeqCst))
            .or_else(|| Some(&self.nodes[start % len]))
    }

    fn set_health(&self, node: &Node, healthy: bool) {
        if node.healthy.swap(healthy, Ordering::SeqCst) != healthy {
            self.observer.on_health_change(&HealthEvent {
                node: node.addr.clone(),
                healthy,
            });
            self.observer
                .on_metric(&Metric::counter("riak_pool_health_change"));
        }
    }

    fn record_timing(&self, node: &Node, request: &HttpRequest, elapsed: Duration, success: bool) {
        let millis = elapsed.as_secs_f64() * 1000.0;
        let root = path_root(&request.path);
        let prefix = if success { "LB_Pool_" } else { "LB_fail_" };
        self.observer.on_metric(&Metric::histogram(
            format!("{}{}|{}|{}", prefix, self.pool_name, request.method, root),
            millis,
        ));
        if !success {
            info!(node = %node.addr, path = %request.path, "riak error: took {:.0}ms", millis);
        } else if elapsed > self.slow_threshold {
            info!(node = %node.addr, path = %request.path, "timing_stats: took {:.0}ms", millis);
        }
    }

    fn record_retry(&self, node: &Node, request: &HttpRequest, reason: RetryReason, message: String, attempt: u32) {
        let root = path_root(&request.path).to_string();
        self.observer.on_retry(&RetryEvent {
            node: node.addr.clone(),
            path: request.path.clone(),
            reason,
            message,
            attempt,
        });
        self.observer
            .on_metric(&Metric::counter(format!("riak_retry_path|{root}")));
        self.observer
            .on_metric(&Metric::counter(format!("riak_retry_reason|{}", reason.as_str())));
    }
}

#[async_trait]
impl<C: HttpClient> Transport for PooledTransport<C> {
    async fn execute(
        &self,
        mut request: HttpRequest,
        filter: &dyn RetryFilter,
    ) -> ClientResult<HttpResponse> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let delay = self.retry.delay_for_attempt(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let node = self
                .pick_node()
                .ok_or_else(|| ClientError::configuration("no nodes configured"))?;
            let start = Instant::now();
            let result = self.client.send(&node.addr, &request).await;
            let elapsed = start.elapsed();
            let last_attempt = attempt + 1 >= max_attempts;

            match result {
                Err(message) => {
                    self.record_timing(node, &request, elapsed, false);
                    self.set_health(node, false);
                    if last_attempt {
                        return Err(ClientError::transport(format!(
                            "{} {} failed after {} attempts: {}",
                            request.method,
                            request.path,
                            attempt + 1,
                            message
                        )));
                    }
                    self.record_retry(node, &request, RetryReason::Transport, message, attempt + 1);
                }
                Ok(response) => {
                    self.record_timing(node, &request, elapsed, true);
                    self.set_health(node, true);
                    let retry = filter.should_retry(&mut request, &response);
                    if !retry || last_attempt {
                        if retry {
                            debug!(
                                path = %request.path,
                                status = response.status,
                                "riak retry: giving up after {} attempts",
                                attempt + 1
                            );
                        }
                        return Ok(response);
                    }
                    self.record_retry(
                        node,
                        &request,
                        RetryReason::Filter,
                        format!("status {}", response.status),
                        attempt + 1,
                    );
                }
            }

            attempt += 1;
        }
    }
}
