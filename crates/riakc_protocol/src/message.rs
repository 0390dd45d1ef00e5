//! Request and response envelopes.

use crate::headers::Headers;
use bytes::Bytes;
use std::fmt;

/// Status codes with a defined client meaning.
pub mod status {
    /// Success, value present.
    pub const OK: u16 = 200;
    /// Success, no body.
    pub const NO_CONTENT: u16 = 204;
    /// Multiple representations: the object has siblings.
    pub const MULTIPLE_CHOICES: u16 = 300;
    /// Not modified, passed through untouched.
    pub const NOT_MODIFIED: u16 = 304;
    /// Transient on writes (pre-commit hook start-up race).
    pub const FORBIDDEN: u16 = 403;
    /// Absent.
    pub const NOT_FOUND: u16 = 404;
    /// Transient server failure.
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// HTTP verbs used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
}

impl Method {
    /// The verb as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }

    /// Returns true for the read verb.
    pub fn is_read(&self) -> bool {
        matches!(self, Method::Get)
    }

    /// Returns true for verbs that store data.
    pub fn is_write(&self) -> bool {
        matches!(self, Method::Put | Method::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable retry bookkeeping owned by a single request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Responses seen so far for this request.
    pub attempts: u32,
    /// Not-found responses seen so far.
    pub not_found: u32,
    /// Whether the previous response had an empty body.
    pub last_body_empty: bool,
}

/// A request descriptor: everything needed to issue (and re-issue) one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP verb.
    pub method: Method,
    /// Path including the query string.
    pub path: String,
    /// Request headers.
    pub headers: Headers,
    /// Optional request body.
    pub body: Option<Bytes>,
    /// Whether a not-found read may be retried.
    pub retry_not_found: bool,
    /// Per-request retry state.
    pub retry_state: RetryState,
}

impl HttpRequest {
    /// Creates a request with no body.
    pub fn new(method: Method, path: impl Into<String>, headers: Headers) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            body: None,
            retry_not_found: false,
            retry_state: RetryState::default(),
        }
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets whether a not-found read may be retried.
    pub fn with_retry_not_found(mut self, retry: bool) -> Self {
        self.retry_not_found = retry;
        self
    }

    /// Path without the query string.
    pub fn path_only(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    /// Query string without the leading `?`, if any.
    pub fn query(&self) -> Option<&str> {
        self.path.split_once('?').map(|(_, q)| q)
    }
}

/// A response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// Raw body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Creates a response with no headers and no body.
    pub fn empty(status: u16) -> Self {
        Self::new(status, Headers::new(), Bytes::new())
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_classes() {
        assert!(Method::Get.is_read());
        assert!(!Method::Get.is_write());
        assert!(Method::Put.is_write());
        assert!(Method::Post.is_write());
        assert!(!Method::Delete.is_write());
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn request_path_parts() {
        let req = HttpRequest::new(Method::Get, "/riak/b/k?r=2", Headers::new());
        assert_eq!(req.path_only(), "/riak/b/k");
        assert_eq!(req.query(), Some("r=2"));

        let req = HttpRequest::new(Method::Get, "/riak/b/k", Headers::new());
        assert_eq!(req.path_only(), "/riak/b/k");
        assert_eq!(req.query(), None);
    }

    #[test]
    fn new_request_has_fresh_retry_state() {
        let req = HttpRequest::new(Method::Put, "/riak/b/k", Headers::new())
            .with_body("{}")
            .with_retry_not_found(true);
        assert_eq!(req.retry_state, RetryState::default());
        assert!(req.retry_not_found);
        assert_eq!(req.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn response_success_range() {
        assert!(HttpResponse::empty(204).is_success());
        assert!(!HttpResponse::empty(300).is_success());
        assert!(!HttpResponse::empty(404).is_success());
    }
}
