//! # riakc Protocol
//!
//! Wire-level types for talking to a Riak-style key/value store over HTTP.
//!
//! This crate provides:
//! - `Headers`, a case-insensitive header list
//! - `HttpRequest` / `HttpResponse` envelopes with per-request retry state
//! - Object paths, query strings and URL component encoding
//! - `Value`, the tagged stored-value variant, and its encodings
//! - A tolerant `multipart/mixed` decoder for sibling responses
//!
//! This is a pure protocol crate with no I/O operations.
//!
//! ## Usage
//!
//! ```
//! use riakc_protocol::{object_path, ObjectKey, Query};
//!
//! let key = ObjectKey::new("users", "alice smith");
//! let path = object_path("riak", &key, &Query::default().with_return_body(true));
//! assert_eq!(path, "/riak/users/alice%20smith?returnbody=true");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod headers;
mod message;
mod multipart;
mod path;
mod value;

pub use error::{WireError, WireResult};
pub use headers::{
    Headers, CLIENT_ID_HEADER, CONNECTION_HEADER, CONTENT_TYPE_HEADER, INDEX_HEADER_PREFIX,
    LINK_HEADER, VCLOCK_HEADER,
};
pub use message::{status, HttpRequest, HttpResponse, Method, RetryState};
pub use multipart::{boundary_from_content_type, decode_multipart, is_multipart, Part};
pub use path::{encode_component, index_path, object_path, path_root, ObjectKey, Query};
pub use value::{Encoding, Value};
