//! Read-modify-write.
//!
//! `modify` reads an object, hands the current value to a [`Mutator`] and,
//! when the mutator commits, writes the new value back carrying the causality
//! token from the read. `replace` and `append` are mutators on top of it.

use crate::client::RiakClient;
use crate::config::RequestOptions;
use crate::error::{ClientError, ClientResult};
use crate::lifecycle::ObjectResponse;
use crate::transport::Transport;
use riakc_protocol::{status, Headers, ObjectKey, Value, VCLOCK_HEADER};
use serde_json::Value as Json;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

/// What a mutator decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Write this value, with extra request headers.
    Commit {
        /// New value.
        value: Value,
        /// Extra headers for the write.
        headers: Headers,
    },
    /// Leave the stored value alone.
    NoChange,
    /// Abort the operation with an error.
    Fail(ClientError),
}

/// Completion handle passed to a mutator.
///
/// Dropping the handle abandons the operation.
#[derive(Debug)]
pub struct MutationHandle {
    sender: oneshot::Sender<Mutation>,
}

impl MutationHandle {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Mutation>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Writes `value` back.
    pub fn commit(self, value: impl Into<Value>) {
        self.commit_with_headers(value, Headers::new());
    }

    /// Writes `value` back with extra headers (content type, links, indexes).
    pub fn commit_with_headers(self, value: impl Into<Value>, headers: Headers) {
        self.complete(Mutation::Commit {
            value: value.into(),
            headers,
        });
    }

    /// Ends the operation without writing.
    pub fn no_change(self) {
        self.complete(Mutation::NoChange);
    }

    /// Ends the operation with an error.
    pub fn fail(self, err: ClientError) {
        self.complete(Mutation::Fail(err));
    }

    fn complete(self, mutation: Mutation) {
        let _ = self.sender.send(mutation);
    }
}

/// The transformation step of a read-modify-write.
///
/// Receives the current value (`Value::Absent` if the key does not exist) and
/// must complete the handle exactly once, now or later.
pub trait Mutator: Send + 'static {
    /// Runs the mutation.
    fn mutate(self, current: Value, handle: MutationHandle);
}

impl<F> Mutator for F
where
    F: FnOnce(Value, MutationHandle) + Send + 'static,
{
    fn mutate(self, current: Value, handle: MutationHandle) {
        self(current, handle)
    }
}

/// Mutator behind [`RiakClient::append`].
fn append_item(key: ObjectKey, item: Json) -> impl Mutator {
    move |current: Value, handle: MutationHandle| match current {
        Value::Absent => handle.commit(Value::List(vec![item])),
        Value::List(mut items) => {
            if items.contains(&item) {
                debug!(target_key = %key, "riak append dup: already have {}", item);
                handle.no_change();
            } else {
                items.push(item);
                handle.commit(Value::List(items));
            }
        }
        other => {
            error!(target_key = %key, "riak append err: got non-list value to append: {:?}", other);
            handle.fail(ClientError::Integrity {
                target: key.to_string(),
                message: "stored value is not a list".into(),
            });
        }
    }
}

impl<T: Transport + 'static> RiakClient<T> {
    /// Reads an object, transforms it and writes it back conditionally.
    ///
    /// Outcomes:
    /// - the mutator declines, or commits `Value::Absent`: status 204 and the
    ///   value it was given
    /// - the write returns 204: status 204 and the new value
    /// - the read returns anything but 200 or 404: [`ClientError::Server`]
    /// - the write returns anything but 204: [`ClientError::UnexpectedStatus`]
    ///
    /// The write never asks for a body back, whatever `options` says.
    pub async fn modify<M: Mutator>(
        &self,
        bucket: &str,
        key: &str,
        mutator: M,
        options: RequestOptions,
    ) -> ClientResult<ObjectResponse> {
        let target = ObjectKey::new(bucket, key);
        if self.config().debug {
            debug!(target_key = %target, "riak modify");
        }

        let read = self.get(bucket, key, options.clone()).await?;
        let current = match read.status {
            status::OK => read.value.clone(),
            status::NOT_FOUND => Value::Absent,
            other => {
                warn!(target_key = %target, "riak modify error: status {}", other);
                return Err(ClientError::Server {
                    target: target.to_string(),
                    status: other,
                });
            }
        };

        let (handle, receiver) = MutationHandle::channel();
        mutator.mutate(current.clone(), handle);
        let mutation = receiver.await.map_err(|_| {
            ClientError::Abandoned(format!("mutator for {target} dropped its handle"))
        })?;

        let (value, extra_headers) = match mutation {
            Mutation::NoChange
            | Mutation::Commit {
                value: Value::Absent,
                ..
            } => {
                if self.config().debug {
                    debug!(target_key = %target, "riak modify no change");
                }
                return Ok(ObjectResponse::new(status::NO_CONTENT, Headers::new(), current));
            }
            Mutation::Fail(err) => return Err(err),
            Mutation::Commit { value, headers } => (value, headers),
        };

        let mut write_options = options.with_return_body(false);
        write_options.headers.extend(&extra_headers);
        if read.status == status::OK {
            if let Some(vclock) = read.vclock() {
                write_options.headers.insert(VCLOCK_HEADER, vclock);
            }
        }

        let written = self.put(bucket, key, value.clone(), write_options).await?;
        if written.status != status::NO_CONTENT {
            return Err(ClientError::UnexpectedStatus {
                target: target.to_string(),
                status: written.status,
            });
        }
        Ok(ObjectResponse::new(written.status, written.headers, value))
    }

    /// Overwrites an object, carrying the causality token of the current version.
    pub async fn replace(
        &self,
        bucket: &str,
        key: &str,
        value: impl Into<Value>,
        options: RequestOptions,
    ) -> ClientResult<ObjectResponse> {
        let value = value.into();
        if self.config().debug {
            debug!(bucket, key, "riak replace = {:?}", value);
        }
        self.modify(
            bucket,
            key,
            move |_current: Value, handle: MutationHandle| handle.commit(value),
            options,
        )
        .await
    }

    /// Adds `item` to a stored list unless it is already there.
    ///
    /// A missing key starts a new list. A stored value that is not a list is
    /// an [`ClientError::Integrity`] error.
    pub async fn append(
        &self,
        bucket: &str,
        key: &str,
        item: impl Into<Json>,
        options: RequestOptions,
    ) -> ClientResult<ObjectResponse> {
        let item = item.into();
        if self.config().debug {
            debug!(bucket, key, "riak append += {}", item);
        }
        let mutator = append_item(ObjectKey::new(bucket, key), item);
        self.modify(bucket, key, mutator, options).await
    }
}
