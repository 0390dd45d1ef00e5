//! # riakc Client
//!
//! Retrying, conflict-resolving client for Riak-style key/value stores.
//!
//! This crate provides:
//! - Retry policy for transient statuses (500, 403 on writes, one extra 404)
//! - Pooled transport with round-robin nodes, passive health and backoff
//! - Request lifecycle state machine with exactly-once outcome delivery
//! - Sibling resolution through a caller-supplied resolver
//! - Read-modify-write (`modify`, `replace`, `append`) using vector clocks
//! - Observer capability for metrics, health and retry events
//!
//! ## Key Invariants
//!
//! - Every operation resolves exactly once
//! - A write conditioned on a read carries that read's vclock
//! - Siblings are only ever reduced by the caller's resolver
//! - Retry state belongs to one request and is never shared
//!
//! ## Usage
//!
//! ```no_run
//! use riakc_client::{ClientConfig, MutationHandle, RequestOptions, RiakClient};
//! use riakc_client::protocol::Value;
//! use serde_json::json;
//!
//! # async fn demo<C: riakc_client::HttpClient + 'static>(http: C) -> riakc_client::ClientResult<()> {
//! let client = RiakClient::connect(ClientConfig::with_random_client_id(vec!["127.0.0.1:8098".into()]), http)?;
//!
//! let options = RequestOptions::new().with_resolver(|siblings, handle| {
//!     let newest = siblings.values().last().cloned().unwrap_or_default();
//!     handle.resolve_and_save(newest);
//! });
//!
//! client
//!     .modify("counters", "visits", |current: Value, handle: MutationHandle| {
//!         let n = current.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
//!         handle.commit(json!({ "count": n + 1 }));
//!     }, options)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod lifecycle;
mod modify;
mod observer;
mod outcome;
mod resolver;
mod retry;
mod transport;

#[cfg(feature = "reqwest")]
mod reqwest_client;

pub use client::{IndexResponse, RiakClient};
pub use config::{ClientConfig, RequestOptions, RetryConfig};
pub use error::{ClientError, ClientResult};
pub use lifecycle::{
    transition, Effect, LifecycleContext, LifecycleEvent, LifecycleState, ObjectResponse,
    JSON_CONTENT_TYPE, RAW_CONTENT_TYPE,
};
pub use modify::{Mutation, MutationHandle, Mutator};
pub use observer::{
    HealthEvent, Metric, MetricKind, NoopObserver, Observer, RetryEvent, RetryReason,
    TracingObserver,
};
pub use outcome::OutcomeSlot;
pub use resolver::{Resolution, ResolutionHandle, Resolver, Sibling, SiblingSet};
pub use retry::{NeverRetry, RetryFilter, RetryPolicy};
pub use transport::{HttpClient, PooledTransport, Transport};

#[cfg(feature = "reqwest")]
pub use reqwest_client::ReqwestClient;

pub use riakc_protocol as protocol;
