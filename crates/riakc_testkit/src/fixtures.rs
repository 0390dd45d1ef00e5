//! Test fixtures.
//!
//! [`TestCluster`] wires a [`MemoryNode`] and a [`RecordingObserver`] to a
//! client over the pooled transport, so tests exercise the same retry and
//! lifecycle paths a real deployment does.

use crate::node::MemoryNode;
use crate::observer::RecordingObserver;
use riakc_client::{
    ClientConfig, PooledTransport, ResolutionHandle, RetryConfig, RiakClient, SiblingSet,
};
use riakc_protocol::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Client type used by the fixtures.
pub type TestClient = RiakClient<PooledTransport<Arc<MemoryNode>>>;

/// A node, an observer and a client talking to each other.
pub struct TestCluster {
    /// The store.
    pub node: Arc<MemoryNode>,
    /// Everything the client reported.
    pub observer: Arc<RecordingObserver>,
    /// The client under test.
    pub client: TestClient,
}

impl TestCluster {
    /// Creates a cluster with fast retries.
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// Creates a cluster, letting the caller adjust the client configuration.
    pub fn with_config(adjust: impl FnOnce(ClientConfig) -> ClientConfig) -> Self {
        let node = Arc::new(MemoryNode::new());
        let observer = Arc::new(RecordingObserver::new());
        let config = adjust(test_config());
        let client = RiakClient::connect_with_observer(config, Arc::clone(&node), observer.clone())
            .expect("Failed to build test client");
        Self {
            node,
            observer,
            client,
        }
    }
}

impl Default for TestCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestCluster {
    type Target = TestClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

/// Client configuration used by [`TestCluster`]: one node, millisecond backoff.
pub fn test_config() -> ClientConfig {
    ClientConfig::new(vec!["memory:8098".into()], "testkit-client").with_retry(
        RetryConfig::new(5)
            .with_initial_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(5))
            .with_jitter(false),
    )
}

/// Resolver that keeps the first sibling, optionally writing it back.
pub fn first_sibling(persist: bool) -> impl Fn(SiblingSet, ResolutionHandle) + Send + Sync + 'static {
    move |siblings: SiblingSet, handle: ResolutionHandle| {
        let first = siblings.values().next().cloned().unwrap_or(Value::Absent);
        if persist {
            handle.resolve_and_save(first);
        } else {
            handle.resolve(first);
        }
    }
}

/// Resolver that unions list siblings in first-seen order and writes the result back.
pub fn merge_lists() -> impl Fn(SiblingSet, ResolutionHandle) + Send + Sync + 'static {
    |siblings: SiblingSet, handle: ResolutionHandle| {
        let mut merged = Vec::new();
        for item in siblings.values().filter_map(Value::as_list).flatten() {
            if !merged.contains(item) {
                merged.push(item.clone());
            }
        }
        handle.resolve_and_save(Value::List(merged));
    }
}

/// Polls `check` until it returns true or `timeout` passes.
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

/// Installs a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
