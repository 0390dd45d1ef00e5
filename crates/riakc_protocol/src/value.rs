//! Stored value variant and body encodings.

use crate::error::{WireError, WireResult};
use bytes::Bytes;
use serde_json::{json, Map, Value as Json};

/// How object bodies are encoded on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Bodies are JSON documents.
    #[default]
    Json,
    /// Bodies are passed through untouched.
    Raw,
}

/// A stored value, classified by shape when it is decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value stored (first write, or not found on read).
    #[default]
    Absent,
    /// A JSON string, number, boolean or null.
    Scalar(Json),
    /// A JSON array.
    List(Vec<Json>),
    /// A JSON object.
    Document(Map<String, Json>),
    /// An undecoded body (structured encoding disabled).
    Raw(Bytes),
}

impl Value {
    /// Classifies a JSON value.
    pub fn from_json(json: Json) -> Self {
        match json {
            Json::Array(items) => Value::List(items),
            Json::Object(map) => Value::Document(map),
            other => Value::Scalar(other),
        }
    }

    /// Converts back to JSON.
    ///
    /// `Absent` becomes `null`; raw bodies become a string when they are UTF-8.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Absent => Json::Null,
            Value::Scalar(json) => json.clone(),
            Value::List(items) => Json::Array(items.clone()),
            Value::Document(map) => Json::Object(map.clone()),
            Value::Raw(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// A string scalar.
    pub fn text(text: impl Into<String>) -> Self {
        Value::Scalar(Json::String(text.into()))
    }

    /// The synthesized error-shaped object returned as data.
    pub fn error_shaped(message: impl Into<String>) -> Self {
        Value::from_json(json!({ "error": message.into() }))
    }

    /// Error-shaped wrapper around a non-200 text body.
    pub fn status_shaped(body: &[u8], status: u16) -> Self {
        Value::from_json(json!({
            "body": String::from_utf8_lossy(body),
            "statusCode": status,
        }))
    }

    /// Returns true for `Absent`.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// The list items, if this is a list.
    pub fn as_list(&self) -> Option<&[Json]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// The document, if this is a document.
    pub fn as_document(&self) -> Option<&Map<String, Json>> {
        match self {
            Value::Document(map) => Some(map),
            _ => None,
        }
    }

    /// The string, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Json::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The raw bytes, if this is a raw body.
    pub fn as_raw(&self) -> Option<&Bytes> {
        match self {
            Value::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Field lookup on a document.
    pub fn get(&self, field: &str) -> Option<&Json> {
        self.as_document().and_then(|map| map.get(field))
    }

    /// Decodes a body.
    pub fn decode(encoding: Encoding, body: &[u8]) -> WireResult<Self> {
        match encoding {
            Encoding::Raw => Ok(Value::Raw(Bytes::copy_from_slice(body))),
            Encoding::Json => serde_json::from_slice::<Json>(body)
                .map(Value::from_json)
                .map_err(|e| WireError::invalid_json(e.to_string())),
        }
    }

    /// Encodes a body.
    ///
    /// Raw encoding sends raw bytes and string scalars verbatim and anything
    /// else as JSON text.
    pub fn encode(&self, encoding: Encoding) -> WireResult<Bytes> {
        match (self, encoding) {
            (Value::Absent, _) => Ok(Bytes::new()),
            (Value::Raw(bytes), _) => Ok(bytes.clone()),
            (Value::Scalar(Json::String(s)), Encoding::Raw) => Ok(Bytes::from(s.clone())),
            (other, _) => serde_json::to_vec(&other.to_json())
                .map(Bytes::from)
                .map_err(|e| WireError::encode(e.to_string())),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::from_json(json)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::text(text)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::text(text)
    }
}
