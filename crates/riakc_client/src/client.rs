//! Caller-facing client.

use crate::config::{ClientConfig, RequestOptions};
use crate::error::{ClientError, ClientResult};
use crate::lifecycle::{Lifecycle, LifecycleContext, ObjectResponse, JSON_CONTENT_TYPE, RAW_CONTENT_TYPE};
use crate::observer::{Observer, TracingObserver};
use crate::retry::RetryPolicy;
use crate::transport::{HttpClient, PooledTransport, Transport};
use bytes::Bytes;
use riakc_protocol::{
    index_path, object_path, status, Encoding, Headers, HttpRequest, HttpResponse, Method,
    ObjectKey, Query, Value, CLIENT_ID_HEADER, CONNECTION_HEADER, CONTENT_TYPE_HEADER,
};
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Result of a secondary-index query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexResponse {
    /// Status code.
    pub status: u16,
    /// Matching keys; empty unless the status was 200.
    pub keys: Vec<String>,
}

/// Client for a Riak-style key/value store.
///
/// Every operation resolves exactly once, with either an error or a response.
/// Statuses the client does not convert into errors are returned as data, so
/// callers check `status` for domain outcomes such as 204 on writes or 404 on
/// reads.
///
/// # Example
///
/// ```no_run
/// use riakc_client::{ClientConfig, RequestOptions, RiakClient};
/// use serde_json::json;
///
/// # async fn demo<C: riakc_client::HttpClient + 'static>(http: C) -> riakc_client::ClientResult<()> {
/// let config = ClientConfig::new(vec!["127.0.0.1:8098".into()], "app-1");
/// let client = RiakClient::connect(config, http)?;
///
/// client.put("users", "alice", json!({"visits": 0}), RequestOptions::new()).await?;
/// let response = client.get("users", "alice", RequestOptions::new()).await?;
/// assert_eq!(response.status, 200);
/// # Ok(())
/// # }
/// ```
pub struct RiakClient<T: Transport> {
    config: ClientConfig,
    transport: Arc<T>,
    policy: Arc<RetryPolicy>,
    observer: Arc<dyn Observer>,
}

impl<C: HttpClient + 'static> RiakClient<PooledTransport<C>> {
    /// Creates a client over a pooled transport, reporting through `tracing`.
    pub fn connect(config: ClientConfig, http: C) -> ClientResult<Self> {
        Self::connect_with_observer(config, http, Arc::new(TracingObserver))
    }

    /// Creates a client over a pooled transport with a custom observer.
    pub fn connect_with_observer(
        config: ClientConfig,
        http: C,
        observer: Arc<dyn Observer>,
    ) -> ClientResult<Self> {
        config.validate()?;
        let transport = PooledTransport::new(
            http,
            config.nodes.clone(),
            config.retry.clone(),
            Arc::clone(&observer),
        )
        .with_pool_name(config.pool_name.clone())
        .with_slow_threshold(config.slow_request_threshold);
        Self::new(config, transport, observer)
    }
}

impl<T: Transport + 'static> RiakClient<T> {
    /// Creates a client over any transport.
    pub fn new(config: ClientConfig, transport: T, observer: Arc<dyn Observer>) -> ClientResult<Self> {
        config.validate()?;
        let policy = RetryPolicy::new(Arc::clone(&observer))
            .with_not_found_retries(config.not_found_retries);
        Ok(Self {
            config,
            transport: Arc::new(transport),
            policy: Arc::new(policy),
            observer,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the observer.
    pub fn observer(&self) -> &Arc<dyn Observer> {
        &self.observer
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> Headers {
        Headers::new()
            .with(CLIENT_ID_HEADER, self.config.client_id.as_str())
            .with(CONNECTION_HEADER, "keep-alive")
    }

    /// Reads an object.
    ///
    /// A 404 is retried once (see [`RequestOptions::retry_on_not_found`])
    /// and then returned as data.
    pub async fn get(
        &self,
        bucket: &str,
        key: &str,
        options: RequestOptions,
    ) -> ClientResult<ObjectResponse> {
        let key = ObjectKey::new(bucket, key);
        self.trace("riak get", &key, &options);
        let ctx = self.context(key, Method::Get, &options, None);
        self.run(ctx).await
    }

    /// Stores an object.
    ///
    /// Succeeds with 204, or 200 and the stored body with `return_body`.
    /// `Content-Type` defaults to `application/json`, or
    /// `application/octet-stream` for raw encoding.
    pub async fn put(
        &self,
        bucket: &str,
        key: &str,
        value: impl Into<Value>,
        options: RequestOptions,
    ) -> ClientResult<ObjectResponse> {
        let key = ObjectKey::new(bucket, key);
        self.trace("riak put", &key, &options);

        let value: Value = value.into();
        let body = value.encode(options.encoding)?;
        let ctx = self.context(key, Method::Put, &options, Some(body));
        self.run(ctx).await
    }

    /// Deletes an object.
    ///
    /// The response is returned untouched. Deletes never retry on not-found.
    pub async fn delete(&self, bucket: &str, key: &str) -> ClientResult<HttpResponse> {
        let key = ObjectKey::new(bucket, key);
        if self.config.debug {
            debug!(target_key = %key, "riak del");
        }

        let headers = Headers::new()
            .with(CLIENT_ID_HEADER, self.config.client_id.as_str())
            .with(CONNECTION_HEADER, "close");
        let request = HttpRequest::new(
            Method::Delete,
            object_path(&self.config.namespace, &key, &Query::default()),
            headers,
        );
        self.transport.delete(request, self.policy.as_ref()).await
    }

    /// POSTs a JSON document to an arbitrary path, such as `/mapred`.
    ///
    /// A 200 with a body is decoded as JSON. Anything else is returned as an
    /// error-shaped `{"error": "non-JSON: <body>"}` value.
    pub async fn post(&self, path: &str, body: &Json) -> ClientResult<ObjectResponse> {
        let payload = serde_json::to_vec(body).map_err(|e| ClientError::Protocol(e.to_string()))?;
        if self.config.debug {
            debug!(path, body = %body, "riak post");
        }

        let headers = self.headers().with(CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE);
        let request = HttpRequest::new(Method::Post, path, headers).with_body(payload);
        let response = self
            .transport
            .post(request, self.policy.as_ref())
            .await
            .map_err(|err| {
                error!(path, "riak post err: {}", err);
                err
            })?;

        let value = if !response.body.is_empty() && response.status == status::OK {
            Value::decode(Encoding::Json, &response.body).map_err(|err| {
                warn!(path, "riak post JSON err: {}", response.body_text());
                ClientError::from(err)
            })?
        } else {
            warn!(path, status = response.status, "riak post: non-200 status: {}", response.body_text());
            Value::error_shaped(format!("non-JSON: {}", response.body_text()))
        };
        Ok(ObjectResponse::new(response.status, response.headers, value))
    }

    /// Queries a secondary index.
    ///
    /// Passing `end` makes it a range query; otherwise `begin` must match exactly.
    pub async fn index(
        &self,
        bucket: &str,
        index: &str,
        begin: &str,
        end: Option<&str>,
    ) -> ClientResult<IndexResponse> {
        let path = index_path(bucket, index, begin, end);
        if self.config.debug {
            debug!(path = %path, "riak index");
        }

        let request = HttpRequest::new(Method::Get, path, self.headers());
        let response = self.transport.get(request, self.policy.as_ref()).await?;
        if response.status != status::OK {
            warn!(bucket, index, status = response.status, "riak index: {}", response.body_text());
            return Ok(IndexResponse {
                status: response.status,
                keys: Vec::new(),
            });
        }

        let value = Value::decode(Encoding::Json, &response.body)?;
        let keys = value
            .get("keys")
            .and_then(Json::as_array)
            .ok_or_else(|| ClientError::Decode(format!("index response for {bucket} has no keys")))?
            .iter()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect();
        Ok(IndexResponse {
            status: response.status,
            keys,
        })
    }

    pub(crate) fn context(
        &self,
        key: ObjectKey,
        method: Method,
        options: &RequestOptions,
        body: Option<Bytes>,
    ) -> LifecycleContext {
        let mut headers = self.headers();
        headers.extend(&options.headers);
        if body.is_some() {
            headers.insert_default(
                CONTENT_TYPE_HEADER,
                match options.encoding {
                    Encoding::Json => JSON_CONTENT_TYPE,
                    Encoding::Raw => RAW_CONTENT_TYPE,
                },
            );
        }
        LifecycleContext {
            key,
            namespace: self.config.namespace.clone(),
            method,
            query: options.query(),
            client_headers: self.headers(),
            headers,
            body,
            encoding: options.encoding,
            retry_not_found: options.retry_on_not_found,
            resolver: options.resolver.clone(),
        }
    }

    pub(crate) async fn run(&self, ctx: LifecycleContext) -> ClientResult<ObjectResponse> {
        let target = ctx.target();
        let outcome = Lifecycle {
            ctx,
            transport: Arc::clone(&self.transport),
            policy: Arc::clone(&self.policy),
            detach_resolved_writes: self.config.detach_resolved_writes,
        }
        .run()
        .await;

        if self.config.debug {
            match &outcome {
                Ok(response) => debug!(target_key = %target, status = response.status, "riak response"),
                Err(err) => debug!(target_key = %target, "riak response error: {}", err),
            }
        }
        outcome
    }

    pub(crate) fn trace(&self, op: &str, key: &ObjectKey, options: &RequestOptions) {
        if self.config.debug {
            debug!(target_key = %key, options = ?options, "{}", op);
        }
    }
}
