//! Error types for the client.

use riakc_protocol::WireError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur during an object-level operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Network-level failure reported by the transport.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// Malformed multipart body or boundary, or a sibling response that was not multipart.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A body (or one sibling part) could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The operation was configured in a way that cannot work.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The resolver declined to reduce the siblings to one value.
    #[error("unable to resolve sibling values for {target}")]
    Resolution {
        /// Bucket and key of the conflicted object.
        target: String,
    },

    /// The stored value has the wrong shape for the operation.
    #[error("integrity error for {target}: {message}")]
    Integrity {
        /// Bucket and key of the object.
        target: String,
        /// What was wrong.
        message: String,
    },

    /// The read half of a read-modify-write got an unexpected status.
    #[error("server error {status} reading {target}, please try again later")]
    Server {
        /// Bucket and key of the object.
        target: String,
        /// Status code of the read.
        status: u16,
    },

    /// The write half of a read-modify-write (or a persist) got an unexpected status.
    #[error("unexpected status {status} writing {target}")]
    UnexpectedStatus {
        /// Bucket and key of the object.
        target: String,
        /// Status code of the write.
        status: u16,
    },

    /// The operation ended without anyone completing it.
    #[error("operation abandoned: {0}")]
    Abandoned(String),
}

impl ClientError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if this error can be retried by issuing the operation again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }
}

impl From<WireError> for ClientError {
    fn from(err: WireError) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Protocol(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(ClientError::transport("connection reset").is_retryable());
        assert!(!ClientError::Decode("bad json".into()).is_retryable());
        assert!(!ClientError::Resolution { target: "b/k".into() }.is_retryable());
    }

    #[test]
    fn wire_errors_map_to_taxonomy() {
        let err: ClientError = WireError::invalid_json("eof").into();
        assert!(matches!(err, ClientError::Decode(_)));

        let err: ClientError = WireError::MissingBoundary {
            content_type: "multipart/mixed".into(),
        }
        .into();
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[test]
    fn error_display() {
        let err = ClientError::Server {
            target: "bucket_1/key_3".into(),
            status: 503,
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("bucket_1/key_3"));

        let err = ClientError::Resolution { target: "b/k".into() };
        assert_eq!(err.to_string(), "unable to resolve sibling values for b/k");
    }
}
