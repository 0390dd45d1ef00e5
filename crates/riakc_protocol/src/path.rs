//! Object keys, request paths and query strings.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// Characters left alone by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A (bucket, key) pair addressing one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    /// Bucket name.
    pub bucket: String,
    /// Key within the bucket.
    pub key: String,
}

impl ObjectKey {
    /// Creates an object key.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Query parameters understood by the object endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Query {
    /// Read quorum.
    pub r: Option<u32>,
    /// Write quorum.
    pub w: Option<u32>,
    /// Ask the store to return the stored body on writes.
    pub return_body: bool,
}

impl Query {
    /// Sets the read quorum.
    pub fn with_r(mut self, r: u32) -> Self {
        self.r = Some(r);
        self
    }

    /// Sets the write quorum.
    pub fn with_w(mut self, w: u32) -> Self {
        self.w = Some(w);
        self
    }

    /// Sets the return-body flag.
    pub fn with_return_body(mut self, return_body: bool) -> Self {
        self.return_body = return_body;
        self
    }

    /// Renders `?r=..&w=..&returnbody=true`, or an empty string.
    pub fn render(&self) -> String {
        let mut pairs = Vec::with_capacity(3);
        if let Some(r) = self.r {
            pairs.push(format!("r={r}"));
        }
        if let Some(w) = self.w {
            pairs.push(format!("w={w}"));
        }
        if self.return_body {
            pairs.push("returnbody=true".to_string());
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

/// Percent-encodes one path component.
pub fn encode_component(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

/// Builds `/<namespace>/<bucket>/<key>[?query]`.
pub fn object_path(namespace: &str, key: &ObjectKey, query: &Query) -> String {
    format!(
        "/{}/{}/{}{}",
        namespace,
        encode_component(&key.bucket),
        encode_component(&key.key),
        query.render()
    )
}

/// Builds a secondary-index query path.
///
/// An exact-match query passes no `end`; an empty `end` is treated the same.
pub fn index_path(bucket: &str, index: &str, begin: &str, end: Option<&str>) -> String {
    let mut path = format!(
        "/buckets/{}/index/{}/{}",
        encode_component(bucket),
        encode_component(index),
        encode_component(begin)
    );
    if let Some(end) = end.filter(|e| !e.is_empty()) {
        path.push('/');
        path.push_str(&encode_component(end));
    }
    path
}

/// Short label for a path, used in metric keys.
pub fn path_root(path: &str) -> &str {
    let mut parts = path.split('/');
    let first = parts.next().unwrap_or("");
    let second = parts.next();
    if second == Some("solr") {
        return "solr";
    }
    if first == "mapred" {
        return "mapred";
    }
    let root = parts.next().unwrap_or("");
    root.split('?').next().unwrap_or(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_encoding_matches_uri_component_rules() {
        assert_eq!(encode_component("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_component("it's(ok)!~*._-"), "it's(ok)!~*._-");
        assert_eq!(encode_component("ключ"), "%D0%BA%D0%BB%D1%8E%D1%87");
    }

    #[test]
    fn query_rendering() {
        assert_eq!(Query::default().render(), "");
        assert_eq!(Query::default().with_r(2).render(), "?r=2");
        assert_eq!(
            Query::default().with_w(3).with_r(1).with_return_body(true).render(),
            "?r=1&w=3&returnbody=true"
        );
    }

    #[test]
    fn object_paths() {
        let key = ObjectKey::new("bucket_1", "key/0");
        assert_eq!(object_path("riak", &key, &Query::default()), "/riak/bucket_1/key%2F0");
        assert_eq!(key.to_string(), "bucket_1/key/0");
    }

    #[test]
    fn index_paths() {
        assert_eq!(index_path("b", "id_int", "1", None), "/buckets/b/index/id_int/1");
        assert_eq!(index_path("b", "id_int", "1", Some("")), "/buckets/b/index/id_int/1");
        assert_eq!(
            index_path("b", "name_bin", "a", Some("m")),
            "/buckets/b/index/name_bin/a/m"
        );
    }

    #[test]
    fn path_roots() {
        assert_eq!(path_root("/riak/users/alice?r=2"), "users");
        assert_eq!(path_root("/riak/users"), "users");
        assert_eq!(path_root("/solr/users/select?q=x"), "solr");
        assert_eq!(path_root("mapred"), "mapred");
        assert_eq!(path_root("/mapred"), "");
    }

    proptest::proptest! {
        #[test]
        fn encoded_keys_stay_in_one_segment(key in "\\PC{0,24}") {
            let path = object_path("riak", &ObjectKey::new("b", key.as_str()), &Query::default());
            let segments: Vec<&str> = path.split('/').collect();
            proptest::prop_assert_eq!(segments.len(), 4);
            proptest::prop_assert!(!path.contains('?'));

            let decoded = percent_encoding::percent_decode_str(segments[3]).decode_utf8_lossy();
            proptest::prop_assert_eq!(&*decoded, key.as_str());
        }
    }
}
