//! # riakc Testkit
//!
//! Test utilities for the riakc client.
//!
//! This crate provides:
//! - An in-memory store node with vclocks, siblings, secondary indexes and fault injection
//! - An observer that records metrics, health changes and retries
//! - A cluster fixture wiring node, observer and client together
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use riakc_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn round_trip() {
//!     let cluster = TestCluster::new();
//!     cluster.put("users", "alice", json!({"n": 1}), RequestOptions::new()).await.unwrap();
//!     assert_eq!(cluster.node.stored_json("users", "alice"), Some(json!({"n": 1})));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod node;
pub mod observer;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::node::*;
    pub use crate::observer::*;
}

pub use fixtures::*;
pub use generators::*;
pub use node::*;
pub use observer::*;
