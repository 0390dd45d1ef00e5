//! `multipart/mixed` decoding for sibling responses.
//!
//! The store answers a read of a conflicted object with one part per sibling:
//!
//! ```text
//! \r\n--<boundary>\r\n
//! Content-Type: application/json\r\n
//! \r\n
//! {"v":1}
//! \r\n--<boundary>\r\n
//! ...
//! \r\n--<boundary>--\r\n
//! ```
//!
//! Delimiter lines accept either CR-LF or bare LF.

use crate::error::{WireError, WireResult};
use crate::headers::Headers;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;

/// Boundary parameter, RFC 1341 character set.
static BOUNDARY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"boundary=([\w'()+,\-./:=?]+)").expect("valid boundary regex"));

/// First blank line, separating part headers from the part body.
static BLANK_LINE_REGEX: Lazy<BytesRegex> =
    Lazy::new(|| BytesRegex::new(r"\r?\n\r?\n").expect("valid blank line regex"));

static LINE_BREAK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n").expect("valid line break regex"));

static MULTIPART_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*multipart/mixed").expect("valid multipart regex"));

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part headers, names lower-cased.
    pub headers: Headers,
    /// Raw part body.
    pub body: Bytes,
}

/// Returns true if the content type announces a `multipart/mixed` body.
pub fn is_multipart(content_type: &str) -> bool {
    MULTIPART_REGEX.is_match(content_type)
}

/// Extracts the boundary token from a content-type header value.
pub fn boundary_from_content_type(content_type: &str) -> WireResult<&str> {
    BOUNDARY_REGEX
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| WireError::MissingBoundary {
            content_type: content_type.to_string(),
        })
}

/// Splits a multipart body into its parts, in wire order.
///
/// A body with no parts at all is an error ([`WireError::NoParts`]).
pub fn decode_multipart(boundary: &str, body: &[u8]) -> WireResult<Vec<Part>> {
    let delimiter = BytesRegex::new(&format!(
        r"(?:\A|\r?\n)--{}(?:--)?[ \t]*(?:\r?\n|\z)",
        regex::escape(boundary)
    ))
    .map_err(|_| WireError::MissingBoundary {
        content_type: format!("boundary={boundary}"),
    })?;

    let parts: Vec<Part> = delimiter
        .split(body)
        .filter(|fragment| !is_blank(fragment))
        .map(parse_part)
        .collect();

    if parts.is_empty() {
        return Err(WireError::NoParts {
            boundary: boundary.to_string(),
        });
    }
    Ok(parts)
}

fn is_blank(fragment: &[u8]) -> bool {
    fragment.iter().all(|b| b.is_ascii_whitespace())
}

fn parse_part(fragment: &[u8]) -> Part {
    let (header_block, body) = match BLANK_LINE_REGEX.find(fragment) {
        Some(m) => (&fragment[..m.start()], &fragment[m.end()..]),
        None => (fragment, &[][..]),
    };

    let header_text = String::from_utf8_lossy(header_block);
    let mut headers = Headers::new();
    for line in LINE_BREAK_REGEX.split(&header_text) {
        if let Some((name, value)) = line.split_once(": ") {
            headers.insert(name.to_ascii_lowercase(), value);
        }
    }

    Part {
        headers,
        body: Bytes::copy_from_slice(body),
    }
}
