//! Request lifecycle for one object-level operation.
//!
//! The lifecycle is an explicit state machine. [`transition`] is a pure
//! function from `(state, event)` to `(next state, effect)`; a driver
//! performs the effects against the transport and the resolver and feeds the
//! results back in as events.
//!
//! ```text
//! Built -> Dispatched -> Done
//!               |
//!               +-> SiblingsDetected -> ResolverInvoked -> Done
//!                                             |
//!                                             +-> ResolvedWriteDispatched -> Done
//! ```
//!
//! Retries happen inside the transport while the lifecycle is `Dispatched`.

use crate::error::{ClientError, ClientResult};
use crate::outcome::OutcomeSlot;
use crate::resolver::{Resolution, ResolutionHandle, Resolver, Sibling, SiblingSet};
use crate::retry::RetryPolicy;
use crate::transport::Transport;
use bytes::Bytes;
use riakc_protocol::{
    boundary_from_content_type, decode_multipart, is_multipart, object_path, status, Encoding,
    Headers, HttpRequest, HttpResponse, Method, ObjectKey, Query, Value, CONTENT_TYPE_HEADER,
    VCLOCK_HEADER,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Content type used for structured bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Content type used for raw bodies.
pub const RAW_CONTENT_TYPE: &str = "application/octet-stream";

/// The outcome of an object-level operation.
///
/// Responses synthesized by the client (a resolved sibling set, a no-op
/// modify) look the same as real ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// Decoded value.
    pub value: Value,
}

impl ObjectResponse {
    /// Creates a response.
    pub fn new(status: u16, headers: Headers, value: Value) -> Self {
        Self {
            status,
            headers,
            value,
        }
    }

    /// The causality token returned with the response.
    pub fn vclock(&self) -> Option<&str> {
        self.headers.vclock()
    }
}

/// Lifecycle states.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleState {
    /// Request assembled, body encoded.
    Built,
    /// Handed to the transport.
    Dispatched,
    /// The store answered with several versions.
    SiblingsDetected(HttpResponse),
    /// Waiting for the resolver.
    ResolverInvoked {
        /// Causality token of the conflicted object.
        vclock: Option<String>,
    },
    /// The resolved value is being written back.
    ResolvedWriteDispatched {
        /// Response delivered once the write succeeds.
        synthetic: ObjectResponse,
    },
    /// Outcome delivered.
    Done,
}

impl LifecycleState {
    /// Returns true for the terminal state.
    pub fn is_done(&self) -> bool {
        matches!(self, LifecycleState::Done)
    }
}

/// Inputs to the state machine.
#[derive(Debug)]
pub enum LifecycleEvent {
    /// Begin the operation.
    Start,
    /// The transport returned a final response.
    Response(HttpResponse),
    /// The transport gave up.
    Failed(ClientError),
    /// Move on from a state that needs no outside input.
    Proceed,
    /// The resolver completed. `None` means it declined.
    Resolved(Option<Resolution>),
    /// The resolved write-back finished.
    WriteCompleted(ClientResult<HttpResponse>),
}

/// Side effects requested by the state machine.
#[derive(Debug)]
pub enum Effect {
    /// Send a request through the transport.
    Dispatch(HttpRequest),
    /// Feed [`LifecycleEvent::Proceed`] back in.
    Continue,
    /// Call the resolver with these siblings.
    InvokeResolver(SiblingSet),
    /// Write the resolved value back.
    Persist {
        /// The write-back request.
        request: HttpRequest,
        /// Response to deliver for the resolved value.
        synthetic: ObjectResponse,
    },
    /// Deliver the outcome.
    Deliver(ClientResult<ObjectResponse>),
}

/// Everything the state machine needs to know about the operation.
#[derive(Clone)]
pub struct LifecycleContext {
    /// Object addressed.
    pub key: ObjectKey,
    /// First path segment.
    pub namespace: String,
    /// HTTP verb of the initial request.
    pub method: Method,
    /// Quorum and return-body parameters.
    pub query: Query,
    /// Headers every request carries (client id, connection).
    pub client_headers: Headers,
    /// Headers of the initial request.
    pub headers: Headers,
    /// Encoded body of the initial request.
    pub body: Option<Bytes>,
    /// Body encoding.
    pub encoding: Encoding,
    /// Whether not-found reads are retried.
    pub retry_not_found: bool,
    /// Sibling resolver.
    pub resolver: Option<Resolver>,
}

impl LifecycleContext {
    /// Display form of the object key, used in errors and logs.
    pub fn target(&self) -> String {
        self.key.to_string()
    }

    /// The initial request.
    pub fn request(&self) -> HttpRequest {
        let mut request = HttpRequest::new(
            self.method,
            object_path(&self.namespace, &self.key, &self.query),
            self.headers.clone(),
        )
        .with_retry_not_found(self.retry_not_found);
        request.body = self.body.clone();
        request
    }

    fn content_type(&self) -> &'static str {
        match self.encoding {
            Encoding::Json => JSON_CONTENT_TYPE,
            Encoding::Raw => RAW_CONTENT_TYPE,
        }
    }

    fn decode(&self, body: &[u8]) -> ClientResult<Value> {
        Value::decode(self.encoding, body).map_err(|e| {
            error!(target_key = %self.key, "riak req: error parsing response body: {}", e);
            ClientError::from(e)
        })
    }

    fn on_response(&self, response: HttpResponse) -> (LifecycleState, Effect) {
        if response.status == status::NOT_MODIFIED {
            let value = Value::Raw(response.body.clone());
            return done(Ok(ObjectResponse::new(response.status, response.headers, value)));
        }

        if response.body.is_empty() {
            debug!(target_key = %self.key, status = response.status, "riak req empty");
            let value = Value::error_shaped("empty body: ");
            return done(Ok(ObjectResponse::new(response.status, response.headers, value)));
        }

        if response.status == status::MULTIPLE_CHOICES {
            if self.resolver.is_none() {
                return done(Err(ClientError::configuration(format!(
                    "need a resolver to resolve sibling values for {}",
                    self.key
                ))));
            }
            info!(target_key = %self.key, "riak req siblings: got siblings for {}", self.method);
            return (LifecycleState::SiblingsDetected(response), Effect::Continue);
        }

        let value = match self.encoding {
            Encoding::Raw => Value::Raw(response.body.clone()),
            Encoding::Json if response.status != status::OK => {
                Value::status_shaped(&response.body, response.status)
            }
            Encoding::Json => match self.decode(&response.body) {
                Ok(value) => value,
                Err(err) => return done(Err(err)),
            },
        };
        done(Ok(ObjectResponse::new(response.status, response.headers, value)))
    }

    fn on_siblings(&self, response: HttpResponse) -> (LifecycleState, Effect) {
        match self.siblings(&response) {
            Ok(siblings) => {
                let vclock = siblings.vclock().map(str::to_string);
                (
                    LifecycleState::ResolverInvoked { vclock },
                    Effect::InvokeResolver(siblings),
                )
            }
            Err(err) => done(Err(err)),
        }
    }

    fn siblings(&self, response: &HttpResponse) -> ClientResult<SiblingSet> {
        let content_type = response.headers.content_type().unwrap_or("");
        if !is_multipart(content_type) {
            error!(target_key = %self.key, "siblings missing: sibling response is not multipart");
            return Err(ClientError::Protocol(format!(
                "sibling response for {} is not multipart",
                self.key
            )));
        }

        let boundary = boundary_from_content_type(content_type)?;
        let parts = decode_multipart(boundary, &response.body)?;
        if parts.len() <= 1 {
            error!(
                target_key = %self.key,
                "riak get siblings: didn't get multiple sibling values from multipart response"
            );
        }

        let siblings = parts
            .into_iter()
            .map(|part| {
                let value = self.decode(&part.body)?;
                Ok(Sibling {
                    headers: part.headers,
                    value,
                })
            })
            .collect::<ClientResult<Vec<_>>>()?;

        Ok(SiblingSet::new(
            siblings,
            response.headers.vclock().map(str::to_string),
        ))
    }

    fn on_resolved(
        &self,
        vclock: Option<String>,
        resolution: Option<Resolution>,
    ) -> (LifecycleState, Effect) {
        let resolution = match resolution {
            Some(resolution) if !resolution.value.is_absent() => resolution,
            _ => {
                return done(Err(ClientError::Resolution {
                    target: self.target(),
                }))
            }
        };

        let mut headers = self.client_headers.clone();
        headers.extend(&resolution.headers);
        if let Some(vclock) = &vclock {
            headers.insert(VCLOCK_HEADER, vclock.as_str());
        }
        let synthetic = ObjectResponse::new(status::OK, headers.clone(), resolution.value.clone());

        if !resolution.persist {
            info!(target_key = %self.key, "riak resolve siblings skip");
            return done(Ok(synthetic));
        }

        let body = match resolution.value.encode(self.encoding) {
            Ok(body) => body,
            Err(err) => return done(Err(err.into())),
        };
        headers.insert_default(CONTENT_TYPE_HEADER, self.content_type());
        info!(
            target_key = %self.key,
            vclock = vclock.as_deref().unwrap_or(""),
            "riak resolve siblings save"
        );

        let request = HttpRequest::new(
            Method::Put,
            object_path(
                &self.namespace,
                &self.key,
                &Query::default().with_return_body(true),
            ),
            headers,
        )
        .with_body(body)
        .with_retry_not_found(self.retry_not_found);

        (
            LifecycleState::ResolvedWriteDispatched {
                synthetic: synthetic.clone(),
            },
            Effect::Persist { request, synthetic },
        )
    }

    fn on_write_completed(
        &self,
        synthetic: ObjectResponse,
        result: ClientResult<HttpResponse>,
    ) -> (LifecycleState, Effect) {
        match result {
            Ok(response) if response.is_success() => {
                let mut synthetic = synthetic;
                if let Some(vclock) = response.headers.vclock() {
                    synthetic.headers.insert(VCLOCK_HEADER, vclock);
                }
                done(Ok(synthetic))
            }
            Ok(response) => done(Err(ClientError::UnexpectedStatus {
                target: self.target(),
                status: response.status,
            })),
            Err(err) => done(Err(err)),
        }
    }
}

fn done(outcome: ClientResult<ObjectResponse>) -> (LifecycleState, Effect) {
    (LifecycleState::Done, Effect::Deliver(outcome))
}

/// Advances the state machine by one event.
pub fn transition(
    ctx: &LifecycleContext,
    state: LifecycleState,
    event: LifecycleEvent,
) -> (LifecycleState, Effect) {
    match (state, event) {
        (LifecycleState::Built, LifecycleEvent::Start) => {
            (LifecycleState::Dispatched, Effect::Dispatch(ctx.request()))
        }
        (LifecycleState::Dispatched, LifecycleEvent::Response(response)) => {
            ctx.on_response(response)
        }
        (LifecycleState::Dispatched, LifecycleEvent::Failed(err)) => {
            error!(target_key = %ctx.key, "riak response error: {} {}", ctx.method, err);
            done(Err(err))
        }
        (LifecycleState::SiblingsDetected(response), LifecycleEvent::Proceed) => {
            ctx.on_siblings(response)
        }
        (LifecycleState::ResolverInvoked { vclock }, LifecycleEvent::Resolved(resolution)) => {
            ctx.on_resolved(vclock, resolution)
        }
        (
            LifecycleState::ResolvedWriteDispatched { synthetic },
            LifecycleEvent::WriteCompleted(result),
        ) => ctx.on_write_completed(synthetic, result),
        (state, event) => done(Err(ClientError::Protocol(format!(
            "lifecycle for {} received {:?} in state {:?}",
            ctx.key, event, state
        )))),
    }
}

/// Runs one operation through the state machine.
pub(crate) struct Lifecycle<T: Transport> {
    pub(crate) ctx: LifecycleContext,
    pub(crate) transport: Arc<T>,
    pub(crate) policy: Arc<RetryPolicy>,
    pub(crate) detach_resolved_writes: bool,
}

impl<T: Transport + 'static> Lifecycle<T> {
    pub(crate) async fn run(self) -> ClientResult<ObjectResponse> {
        let (slot, receiver) = OutcomeSlot::channel(self.ctx.target());
        self.drive(slot).await;
        match receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ClientError::Abandoned(format!(
                "no outcome delivered for {}",
                self.ctx.key
            ))),
        }
    }

    async fn drive(&self, slot: OutcomeSlot<ClientResult<ObjectResponse>>) {
        let mut state = LifecycleState::Built;
        let mut event = LifecycleEvent::Start;

        loop {
            let (next, effect) = transition(&self.ctx, state, event);
            state = next;
            event = match effect {
                Effect::Dispatch(request) => {
                    match self.transport.execute(request, self.policy.as_ref()).await {
                        Ok(response) => LifecycleEvent::Response(response),
                        Err(err) => LifecycleEvent::Failed(err),
                    }
                }
                Effect::Continue => LifecycleEvent::Proceed,
                Effect::InvokeResolver(siblings) => {
                    let (handle, receiver) = ResolutionHandle::channel();
                    if let Some(resolver) = &self.ctx.resolver {
                        resolver(siblings, handle);
                    }
                    LifecycleEvent::Resolved(receiver.await.ok().flatten())
                }
                Effect::Persist { request, synthetic } if self.detach_resolved_writes => {
                    slot.deliver(Ok(synthetic));
                    self.spawn_write(state, request, slot);
                    return;
                }
                Effect::Persist { request, .. } => LifecycleEvent::WriteCompleted(
                    self.transport.execute(request, self.policy.as_ref()).await,
                ),
                Effect::Deliver(outcome) => {
                    slot.deliver(outcome);
                    return;
                }
            };
        }
    }

    fn spawn_write(
        &self,
        state: LifecycleState,
        request: HttpRequest,
        slot: OutcomeSlot<ClientResult<ObjectResponse>>,
    ) {
        let ctx = self.ctx.clone();
        let transport = Arc::clone(&self.transport);
        let policy = Arc::clone(&self.policy);
        tokio::spawn(async move {
            let result = transport.execute(request, policy.as_ref()).await;
            let (_, effect) = transition(&ctx, state, LifecycleEvent::WriteCompleted(result));
            match effect {
                Effect::Deliver(Err(err)) => {
                    error!(target_key = %ctx.key, "riak resolve more: write-back failed: {}", err);
                    slot.deliver(Err(err));
                }
                _ => info!(target_key = %ctx.key, "riak resolve more: write-back stored"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SIBLINGS: &str = "\r\n--sib\r\nContent-Type: application/json\r\n\r\n{\"n\":1}\r\n--sib\r\nContent-Type: application/json\r\n\r\n{\"n\":2}\r\n--sib--\r\n";

    fn ctx(resolver: bool) -> LifecycleContext {
        LifecycleContext {
            key: ObjectKey::new("users", "alice"),
            namespace: "riak".into(),
            method: Method::Get,
            query: Query::default(),
            client_headers: Headers::new().with("X-Riak-ClientId", "test"),
            headers: Headers::new().with("X-Riak-ClientId", "test"),
            body: None,
            encoding: Encoding::Json,
            retry_not_found: true,
            resolver: resolver.then(|| -> Resolver {
                Arc::new(|_siblings: SiblingSet, handle: ResolutionHandle| handle.decline())
            }),
        }
    }

    fn sibling_response() -> HttpResponse {
        HttpResponse::new(
            300,
            Headers::new()
                .with("content-type", "multipart/mixed; boundary=sib")
                .with("x-riak-vclock", "vclock-7"),
            SIBLINGS,
        )
    }

    fn delivered(effect: Effect) -> ClientResult<ObjectResponse> {
        match effect {
            Effect::Deliver(outcome) => outcome,
            other => panic!("expected delivery, got {other:?}"),
        }
    }

    #[test]
    fn start_dispatches_initial_request() {
        let ctx = ctx(false);
        let (state, effect) = transition(&ctx, LifecycleState::Built, LifecycleEvent::Start);
        assert_eq!(state, LifecycleState::Dispatched);
        match effect {
            Effect::Dispatch(request) => {
                assert_eq!(request.path, "/riak/users/alice");
                assert!(request.retry_not_found);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn plain_response_is_decoded() {
        let response = HttpResponse::new(200, Headers::new(), r#"{"name":"alice"}"#);
        let (state, effect) = transition(
            &ctx(false),
            LifecycleState::Dispatched,
            LifecycleEvent::Response(response),
        );
        assert!(state.is_done());
        let outcome = delivered(effect).unwrap();
        assert_eq!(outcome.value.get("name"), Some(&json!("alice")));
    }

    #[test]
    fn non_ok_text_body_is_wrapped() {
        let response = HttpResponse::new(404, Headers::new(), "not found\n");
        let (_, effect) = transition(
            &ctx(false),
            LifecycleState::Dispatched,
            LifecycleEvent::Response(response),
        );
        let outcome = delivered(effect).unwrap();
        assert_eq!(outcome.status, 404);
        assert_eq!(outcome.value.get("statusCode"), Some(&json!(404)));
        assert_eq!(outcome.value.get("body"), Some(&json!("not found\n")));
    }

    #[test]
    fn empty_body_is_error_shaped_data() {
        let (_, effect) = transition(
            &ctx(false),
            LifecycleState::Dispatched,
            LifecycleEvent::Response(HttpResponse::empty(204)),
        );
        let outcome = delivered(effect).unwrap();
        assert_eq!(outcome.status, 204);
        assert_eq!(outcome.value.get("error"), Some(&json!("empty body: ")));
    }

    #[test]
    fn not_modified_passes_through() {
        let response = HttpResponse::new(304, Headers::new(), "not json");
        let (_, effect) = transition(
            &ctx(false),
            LifecycleState::Dispatched,
            LifecycleEvent::Response(response),
        );
        let outcome = delivered(effect).unwrap();
        assert_eq!(outcome.value, Value::Raw(Bytes::from_static(b"not json")));
    }

    #[test]
    fn bad_json_is_a_decode_error() {
        let response = HttpResponse::new(200, Headers::new(), "{not json");
        let (_, effect) = transition(
            &ctx(false),
            LifecycleState::Dispatched,
            LifecycleEvent::Response(response),
        );
        assert!(matches!(delivered(effect), Err(ClientError::Decode(_))));
    }

    #[test]
    fn siblings_without_resolver_is_a_configuration_error() {
        let (state, effect) = transition(
            &ctx(false),
            LifecycleState::Dispatched,
            LifecycleEvent::Response(sibling_response()),
        );
        assert!(state.is_done());
        assert!(matches!(delivered(effect), Err(ClientError::Configuration(_))));
    }

    #[test]
    fn siblings_are_decoded_and_vclock_captured() {
        let ctx = ctx(true);
        let (state, effect) = transition(
            &ctx,
            LifecycleState::Dispatched,
            LifecycleEvent::Response(sibling_response()),
        );
        assert!(matches!(state, LifecycleState::SiblingsDetected(_)));
        assert!(matches!(effect, Effect::Continue));

        let (state, effect) = transition(&ctx, state, LifecycleEvent::Proceed);
        assert_eq!(
            state,
            LifecycleState::ResolverInvoked {
                vclock: Some("vclock-7".into())
            }
        );
        match effect {
            Effect::InvokeResolver(siblings) => {
                assert_eq!(siblings.len(), 2);
                assert_eq!(siblings.vclock(), Some("vclock-7"));
                let values: Vec<_> = siblings.values().map(|v| v.get("n").cloned()).collect();
                assert_eq!(values, vec![Some(json!(1)), Some(json!(2))]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_multipart_siblings_are_a_protocol_error() {
        let response = HttpResponse::new(
            300,
            Headers::new().with("content-type", "application/json"),
            "{}",
        );
        let (_, effect) = transition(
            &ctx(true),
            LifecycleState::SiblingsDetected(response),
            LifecycleEvent::Proceed,
        );
        assert!(matches!(delivered(effect), Err(ClientError::Protocol(_))));
    }

    #[test]
    fn undecodable_sibling_fails_the_operation() {
        let body = "\r\n--sib\r\n\r\n{\"n\":1}\r\n--sib\r\n\r\n{broken\r\n--sib--\r\n";
        let response = HttpResponse::new(
            300,
            Headers::new().with("content-type", "multipart/mixed; boundary=sib"),
            body,
        );
        let (_, effect) = transition(
            &ctx(true),
            LifecycleState::SiblingsDetected(response),
            LifecycleEvent::Proceed,
        );
        assert!(matches!(delivered(effect), Err(ClientError::Decode(_))));
    }

    #[test]
    fn declined_or_absent_resolution_is_an_error() {
        let ctx = ctx(true);
        for resolution in [None, Some(Resolution::new(Value::Absent))] {
            let (_, effect) = transition(
                &ctx,
                LifecycleState::ResolverInvoked { vclock: None },
                LifecycleEvent::Resolved(resolution),
            );
            assert!(matches!(delivered(effect), Err(ClientError::Resolution { .. })));
        }
    }

    #[test]
    fn unsaved_resolution_is_synthesized() {
        let (state, effect) = transition(
            &ctx(true),
            LifecycleState::ResolverInvoked {
                vclock: Some("vclock-7".into()),
            },
            LifecycleEvent::Resolved(Some(Resolution::new(json!({"n": 3})))),
        );
        assert!(state.is_done());
        let outcome = delivered(effect).unwrap();
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.vclock(), Some("vclock-7"));
        assert_eq!(outcome.headers.get("x-riak-clientid"), Some("test"));
        assert_eq!(outcome.value.get("n"), Some(&json!(3)));
    }

    #[test]
    fn saved_resolution_builds_conditional_write() {
        let resolution = Resolution::new(json!({"n": 3}))
            .with_headers(Headers::new().with("x-riak-index-email_bin", "a@b"))
            .persisted();
        let (state, effect) = transition(
            &ctx(true),
            LifecycleState::ResolverInvoked {
                vclock: Some("vclock-7".into()),
            },
            LifecycleEvent::Resolved(Some(resolution)),
        );
        assert!(matches!(state, LifecycleState::ResolvedWriteDispatched { .. }));
        match effect {
            Effect::Persist { request, synthetic } => {
                assert_eq!(request.method, Method::Put);
                assert_eq!(request.path, "/riak/users/alice?returnbody=true");
                assert_eq!(request.headers.vclock(), Some("vclock-7"));
                assert_eq!(request.headers.get("x-riak-index-email_bin"), Some("a@b"));
                assert_eq!(request.headers.content_type(), Some(JSON_CONTENT_TYPE));
                assert_eq!(request.body.as_deref(), Some(&b"{\"n\":3}"[..]));
                assert_eq!(synthetic.vclock(), Some("vclock-7"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn write_back_failure_is_surfaced() {
        let synthetic = ObjectResponse::new(200, Headers::new(), Value::text("v"));
        let ctx = ctx(true);

        let (_, effect) = transition(
            &ctx,
            LifecycleState::ResolvedWriteDispatched {
                synthetic: synthetic.clone(),
            },
            LifecycleEvent::WriteCompleted(Ok(HttpResponse::empty(500))),
        );
        assert!(matches!(
            delivered(effect),
            Err(ClientError::UnexpectedStatus { status: 500, .. })
        ));

        let (_, effect) = transition(
            &ctx,
            LifecycleState::ResolvedWriteDispatched {
                synthetic: synthetic.clone(),
            },
            LifecycleEvent::WriteCompleted(Ok(HttpResponse::new(200, Headers::new(), "\"v\""))),
        );
        assert_eq!(delivered(effect).unwrap(), synthetic);

        let (_, effect) = transition(
            &ctx,
            LifecycleState::ResolvedWriteDispatched { synthetic },
            LifecycleEvent::WriteCompleted(Ok(HttpResponse::new(
                200,
                Headers::new().with(VCLOCK_HEADER, "vclock-8"),
                "\"v\"",
            ))),
        );
        assert_eq!(delivered(effect).unwrap().vclock(), Some("vclock-8"));
    }

    #[test]
    fn stray_events_terminate() {
        let (state, effect) = transition(&ctx(false), LifecycleState::Done, LifecycleEvent::Proceed);
        assert!(state.is_done());
        assert!(matches!(delivered(effect), Err(ClientError::Protocol(_))));
    }
}
