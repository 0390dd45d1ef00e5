//! Sibling sets and the caller-supplied resolver.
//!
//! When the store answers with several conflicting versions, the client hands
//! them to the resolver together with a [`ResolutionHandle`]. The resolver
//! consumes the handle exactly once, either choosing a value or declining. It
//! may do so synchronously or from another task.

use riakc_protocol::{Headers, Value};
use std::sync::Arc;
use tokio::sync::oneshot;

/// One conflicting version of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Sibling {
    /// Part headers, names lower-cased.
    pub headers: Headers,
    /// Decoded part body.
    pub value: Value,
}

/// The siblings of one conflicted object, in wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiblingSet {
    siblings: Vec<Sibling>,
    vclock: Option<String>,
}

impl SiblingSet {
    /// Creates a sibling set.
    pub fn new(siblings: Vec<Sibling>, vclock: Option<String>) -> Self {
        Self { siblings, vclock }
    }

    /// Number of siblings.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// Returns true if there are no siblings.
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Iterates over the siblings.
    pub fn iter(&self) -> impl Iterator<Item = &Sibling> {
        self.siblings.iter()
    }

    /// Iterates over the sibling values.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.siblings.iter().map(|s| &s.value)
    }

    /// The causality token of the conflicted object.
    pub fn vclock(&self) -> Option<&str> {
        self.vclock.as_deref()
    }
}

impl IntoIterator for SiblingSet {
    type Item = Sibling;
    type IntoIter = std::vec::IntoIter<Sibling>;

    fn into_iter(self) -> Self::IntoIter {
        self.siblings.into_iter()
    }
}

/// The value a resolver settled on.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The chosen value.
    pub value: Value,
    /// Headers to send with the write-back (content type, links, indexes).
    pub headers: Headers,
    /// Whether to write the value back to the store.
    pub persist: bool,
}

impl Resolution {
    /// A resolution that is returned to the caller but not written back.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            headers: Headers::new(),
            persist: false,
        }
    }

    /// Sets the write-back headers.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Marks the resolution to be written back.
    pub fn persisted(mut self) -> Self {
        self.persist = true;
        self
    }
}

/// A sibling resolver.
pub type Resolver = Arc<dyn Fn(SiblingSet, ResolutionHandle) + Send + Sync>;

/// Completion handle passed to a resolver.
///
/// Dropping the handle without calling any method counts as declining.
#[derive(Debug)]
pub struct ResolutionHandle {
    sender: oneshot::Sender<Option<Resolution>>,
}

impl ResolutionHandle {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Option<Resolution>>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Chooses `value` without writing it back.
    pub fn resolve(self, value: impl Into<Value>) {
        self.resolve_with(Resolution::new(value));
    }

    /// Chooses `value` and writes it back under the conflicted vclock.
    pub fn resolve_and_save(self, value: impl Into<Value>) {
        self.resolve_with(Resolution::new(value).persisted());
    }

    /// Completes with a fully specified resolution.
    pub fn resolve_with(self, resolution: Resolution) {
        // the operation may already be gone
        let _ = self.sender.send(Some(resolution));
    }

    /// Declines to resolve the siblings.
    pub fn decline(self) {
        let _ = self.sender.send(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set() -> SiblingSet {
        SiblingSet::new(
            vec![
                Sibling {
                    headers: Headers::new(),
                    value: Value::from(json!({"v": 1})),
                },
                Sibling {
                    headers: Headers::new(),
                    value: Value::from(json!({"v": 2})),
                },
            ],
            Some("a85hYGBgzGDKBVIcR4M2cgczH7HPYEpkzGNlsP".into()),
        )
    }

    #[test]
    fn sibling_set_accessors() {
        let siblings = set();
        assert_eq!(siblings.len(), 2);
        assert!(!siblings.is_empty());
        assert_eq!(siblings.vclock(), Some("a85hYGBgzGDKBVIcR4M2cgczH7HPYEpkzGNlsP"));

        let values: Vec<_> = siblings.values().cloned().collect();
        assert_eq!(values[1], Value::from(json!({"v": 2})));
        assert_eq!(siblings.into_iter().count(), 2);
    }

    #[test]
    fn resolution_builder() {
        let resolution = Resolution::new("merged")
            .with_headers(Headers::new().with("Content-Type", "text/plain"))
            .persisted();
        assert!(resolution.persist);
        assert_eq!(resolution.headers.content_type(), Some("text/plain"));
        assert!(!Resolution::new("x").persist);
    }

    #[tokio::test]
    async fn handle_delivers_resolution() {
        let (handle, receiver) = ResolutionHandle::channel();
        handle.resolve_and_save(json!([1, 2]));
        let resolution = receiver.await.unwrap().unwrap();
        assert!(resolution.persist);
        assert_eq!(resolution.value, Value::List(vec![json!(1), json!(2)]));
    }

    #[tokio::test]
    async fn decline_and_drop_are_equivalent() {
        let (handle, receiver) = ResolutionHandle::channel();
        handle.decline();
        assert_eq!(receiver.await.ok().flatten(), None);

        let (handle, receiver) = ResolutionHandle::channel();
        drop(handle);
        assert_eq!(receiver.await.ok().flatten(), None);
    }

    #[tokio::test]
    async fn resolver_may_complete_from_another_task() {
        let resolver: Resolver = Arc::new(|siblings: SiblingSet, handle: ResolutionHandle| {
            tokio::spawn(async move {
                let first = siblings.values().next().cloned().unwrap_or_default();
                handle.resolve(first);
            });
        });

        let (handle, receiver) = ResolutionHandle::channel();
        resolver(set(), handle);
        let resolution = receiver.await.unwrap().unwrap();
        assert_eq!(resolution.value.get("v"), Some(&json!(1)));
    }
}
