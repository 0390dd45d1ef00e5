//! Exactly-once outcome delivery.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::warn;

struct SlotInner<T> {
    label: String,
    sender: Mutex<Option<oneshot::Sender<T>>>,
    duplicates: AtomicUsize,
}

/// The single place an operation's outcome is delivered through.
///
/// The first delivery wins. Later deliveries are dropped with a warning and
/// counted.
pub struct OutcomeSlot<T> {
    inner: Arc<SlotInner<T>>,
}

impl<T> Clone for OutcomeSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> OutcomeSlot<T> {
    /// Creates a slot and the receiver its outcome arrives on.
    pub fn channel(label: impl Into<String>) -> (Self, oneshot::Receiver<T>) {
        let (sender, receiver) = oneshot::channel();
        let slot = Self {
            inner: Arc::new(SlotInner {
                label: label.into(),
                sender: Mutex::new(Some(sender)),
                duplicates: AtomicUsize::new(0),
            }),
        };
        (slot, receiver)
    }

    /// Delivers `outcome`. Returns false if an outcome was already delivered.
    pub fn deliver(&self, outcome: T) -> bool {
        let sender = self.inner.sender.lock().take();
        match sender {
            Some(sender) => {
                // receiver may have been dropped by a cancelled caller
                let _ = sender.send(outcome);
                true
            }
            None => {
                self.inner.duplicates.fetch_add(1, Ordering::SeqCst);
                warn!(target_key = %self.inner.label, "riak callback dup: outcome already delivered");
                false
            }
        }
    }

    /// Returns true once an outcome has been delivered.
    pub fn is_delivered(&self) -> bool {
        self.inner.sender.lock().is_none()
    }

    /// Number of suppressed deliveries.
    pub fn duplicates(&self) -> usize {
        self.inner.duplicates.load(Ordering::SeqCst)
    }
}
