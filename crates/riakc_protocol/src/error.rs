//! Error types for the protocol crate.

use thiserror::Error;

/// Result type for wire-level operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while interpreting or producing wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The content type carried no usable multipart boundary.
    #[error("couldn't find multipart boundary in content type {content_type:?}")]
    MissingBoundary {
        /// The offending content-type header value.
        content_type: String,
    },

    /// A multipart body split into zero usable parts.
    #[error("multipart body with boundary {boundary:?} contains no parts")]
    NoParts {
        /// The boundary token used for splitting.
        boundary: String,
    },

    /// A body could not be decoded as JSON.
    #[error("JSON parse error: {message}")]
    InvalidJson {
        /// Description of the parse failure.
        message: String,
    },

    /// A value could not be encoded.
    #[error("encoding failed: {message}")]
    Encode {
        /// Description of the encoding failure.
        message: String,
    },
}

impl WireError {
    /// Create a JSON decode error.
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::InvalidJson {
            message: message.into(),
        }
    }

    /// Create an encoding error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Returns true if the error came from decoding content rather than framing.
    pub fn is_decode(&self) -> bool {
        matches!(self, WireError::InvalidJson { .. })
    }
}
