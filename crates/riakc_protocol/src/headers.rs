//! Case-insensitive HTTP header list.

use std::fmt;

/// Header identifying the client to the store.
pub const CLIENT_ID_HEADER: &str = "X-Riak-ClientId";
/// Header carrying the causality token (vector clock).
pub const VCLOCK_HEADER: &str = "X-Riak-Vclock";
/// Standard content type header.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
/// Standard connection header.
pub const CONNECTION_HEADER: &str = "Connection";
/// Link header (object links, passed through untouched).
pub const LINK_HEADER: &str = "Link";
/// Prefix of secondary-index headers (`x-riak-index-<name>_bin|_int`).
pub const INDEX_HEADER_PREFIX: &str = "x-riak-index-";

/// An ordered list of HTTP headers.
///
/// Names compare case-insensitively. The spelling used on insertion is kept
/// so outgoing requests look the way the caller wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header, replacing any existing header with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(pos) => self.entries[pos] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`Headers::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a header only if no header with that name exists yet.
    pub fn insert_default(&mut self, name: &str, value: impl Into<String>) {
        if !self.contains(name) {
            self.entries.push((name.to_string(), value.into()));
        }
    }

    /// Returns the value of a header.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|pos| self.entries[pos].1.as_str())
    }

    /// Returns true if the header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Removes a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|pos| self.entries.remove(pos).1)
    }

    /// Copies every header from `other`; values in `other` win.
    pub fn extend(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The causality token, if present.
    pub fn vclock(&self) -> Option<&str> {
        self.get(VCLOCK_HEADER)
    }

    /// The content type, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE_HEADER)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
            first = false;
        }
        Ok(())
    }
}
