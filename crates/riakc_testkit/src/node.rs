//! In-memory store node.
//!
//! `MemoryNode` answers the HTTP requests the client sends the way a store
//! node would: objects carry a vector clock, buckets with `allow_mult` keep
//! concurrent writes as siblings, and index headers feed secondary-index
//! queries. Faults can be queued to exercise retries.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use percent_encoding::percent_decode_str;
use riakc_client::HttpClient;
use riakc_protocol::{
    status, Headers, HttpRequest, HttpResponse, Method, CONTENT_TYPE_HEADER, INDEX_HEADER_PREFIX,
    LINK_HEADER, VCLOCK_HEADER,
};
use serde::Deserialize;
use serde_json::{json, Value as Json};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

/// Boundary used for sibling responses.
pub const SIBLING_BOUNDARY: &str = "Ly7JbOc2ftmhSYzsFzVAfwxKmVl";

/// What an injected fault does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    /// Answer with this status and a short text body.
    Status(u16),
    /// Fail at the network level with this message.
    Transport(String),
}

/// A queued fault, optionally restricted to one verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Verb the fault applies to; `None` matches any request.
    pub method: Option<Method>,
    /// What happens.
    pub kind: FaultKind,
}

impl Fault {
    /// A status response.
    pub fn status(status: u16) -> Self {
        Self {
            method: None,
            kind: FaultKind::Status(status),
        }
    }

    /// A network failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            method: None,
            kind: FaultKind::Transport(message.into()),
        }
    }

    /// Restricts the fault to one verb.
    pub fn on(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    fn matches(&self, method: Method) -> bool {
        self.method.map_or(true, |m| m == method)
    }
}

#[derive(Debug, Clone)]
struct StoredSibling {
    content_type: String,
    meta: Headers,
    body: Bytes,
}

#[derive(Debug, Clone)]
struct StoredObject {
    vclock: String,
    siblings: Vec<StoredSibling>,
}

#[derive(Default)]
struct NodeState {
    objects: BTreeMap<(String, String), StoredObject>,
    allow_mult: HashSet<String>,
    faults: VecDeque<Fault>,
    log: Vec<HttpRequest>,
    clock: u64,
}

impl NodeState {
    fn next_vclock(&mut self) -> String {
        self.clock += 1;
        format!("vclock-{}", self.clock)
    }
}

#[derive(Deserialize)]
struct MapRedJob {
    inputs: Vec<(String, String)>,
}

/// An in-memory store node.
#[derive(Default)]
pub struct MemoryNode {
    state: Mutex<NodeState>,
}

impl MemoryNode {
    /// Creates an empty node. Every bucket starts with `allow_mult` off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns sibling creation on or off for a bucket.
    pub fn set_allow_mult(&self, bucket: &str, allow: bool) {
        let mut state = self.state.lock();
        if allow {
            state.allow_mult.insert(bucket.to_string());
        } else {
            state.allow_mult.remove(bucket);
        }
    }

    /// Queues a fault. Faults fire in order on the first matching request.
    pub fn inject(&self, fault: Fault) {
        self.state.lock().faults.push_back(fault);
    }

    /// Queues the same fault `count` times.
    pub fn inject_many(&self, fault: Fault, count: usize) {
        let mut state = self.state.lock();
        for _ in 0..count {
            state.faults.push_back(fault.clone());
        }
    }

    /// Number of faults still queued.
    pub fn pending_faults(&self) -> usize {
        self.state.lock().faults.len()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().log.clone()
    }

    /// Requests received with the given verb.
    pub fn requests_with(&self, method: Method) -> Vec<HttpRequest> {
        self.state
            .lock()
            .log
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Forgets the request log.
    pub fn clear_requests(&self) {
        self.state.lock().log.clear();
    }

    /// Stores siblings directly, bypassing the HTTP surface.
    pub fn seed_siblings(&self, bucket: &str, key: &str, bodies: &[&str]) -> String {
        let mut state = self.state.lock();
        let vclock = state.next_vclock();
        let siblings = bodies
            .iter()
            .map(|body| StoredSibling {
                content_type: "application/json".into(),
                meta: Headers::new(),
                body: Bytes::from(body.to_string()),
            })
            .collect();
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                vclock: vclock.clone(),
                siblings,
            },
        );
        vclock
    }

    /// Raw bodies of the stored siblings.
    pub fn stored(&self, bucket: &str, key: &str) -> Option<Vec<Bytes>> {
        self.state
            .lock()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.siblings.iter().map(|s| s.body.clone()).collect())
    }

    /// The stored value decoded as JSON, if there is exactly one sibling.
    pub fn stored_json(&self, bucket: &str, key: &str) -> Option<Json> {
        let bodies = self.stored(bucket, key)?;
        match bodies.as_slice() {
            [body] => serde_json::from_slice(body).ok(),
            _ => None,
        }
    }

    /// The current vclock of an object.
    pub fn vclock(&self, bucket: &str, key: &str) -> Option<String> {
        self.state
            .lock()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.vclock.clone())
    }

    fn handle(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
        let mut state = self.state.lock();
        state.log.push(request.clone());

        if let Some(pos) = state.faults.iter().position(|f| f.matches(request.method)) {
            if let Some(fault) = state.faults.remove(pos) {
                debug!(method = %request.method, path = %request.path, "memory node: injecting {:?}", fault.kind);
                return match fault.kind {
                    FaultKind::Status(code) => Ok(text(code, "injected fault\n")),
                    FaultKind::Transport(message) => Err(message),
                };
            }
        }

        let segments: Vec<String> = request
            .path_only()
            .split('/')
            .skip(1)
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();
        let return_body = request
            .query()
            .map_or(false, |q| q.split('&').any(|p| p == "returnbody=true"));

        match (request.method, segments.as_slice()) {
            (Method::Post, [first]) if first == "mapred" => Ok(map_reduce(&state, request)),
            (Method::Get, [first, bucket, index_word, index, range @ ..])
                if first == "buckets" && index_word == "index" && !range.is_empty() =>
            {
                Ok(index_query(&state, bucket, index, range))
            }
            (Method::Get, [_, bucket, key]) => Ok(get_object(&state, bucket, key)),
            (Method::Put | Method::Post, [_, bucket, key]) => {
                Ok(put_object(&mut state, bucket, key, request, return_body))
            }
            (Method::Delete, [_, bucket, key]) => {
                let removed = state.objects.remove(&(bucket.clone(), key.clone()));
                Ok(match removed {
                    Some(_) => HttpResponse::empty(status::NO_CONTENT),
                    None => text(status::NOT_FOUND, "not found\n"),
                })
            }
            _ => Ok(text(400, "unknown resource\n")),
        }
    }
}

#[async_trait]
impl HttpClient for MemoryNode {
    async fn send(&self, _node: &str, request: &HttpRequest) -> Result<HttpResponse, String> {
        self.handle(request)
    }
}

fn text(code: u16, body: &'static str) -> HttpResponse {
    HttpResponse::new(
        code,
        Headers::new().with(CONTENT_TYPE_HEADER, "text/plain"),
        body,
    )
}

fn object_response(object: &StoredObject, code_single: u16) -> HttpResponse {
    match object.siblings.as_slice() {
        [only] => {
            let mut headers = only.meta.clone();
            headers.insert(CONTENT_TYPE_HEADER, only.content_type.as_str());
            headers.insert(VCLOCK_HEADER, object.vclock.as_str());
            HttpResponse::new(code_single, headers, only.body.clone())
        }
        siblings => {
            let mut body = String::new();
            for sibling in siblings {
                body.push_str(&format!("\r\n--{SIBLING_BOUNDARY}\r\n"));
                body.push_str(&format!("Content-Type: {}\r\n", sibling.content_type));
                for (name, value) in sibling.meta.iter() {
                    body.push_str(&format!("{name}: {value}\r\n"));
                }
                body.push_str("\r\n");
                body.push_str(&String::from_utf8_lossy(&sibling.body));
            }
            body.push_str(&format!("\r\n--{SIBLING_BOUNDARY}--\r\n"));

            let headers = Headers::new()
                .with(
                    CONTENT_TYPE_HEADER,
                    format!("multipart/mixed; boundary={SIBLING_BOUNDARY}"),
                )
                .with(VCLOCK_HEADER, object.vclock.as_str());
            HttpResponse::new(status::MULTIPLE_CHOICES, headers, body)
        }
    }
}

fn get_object(state: &NodeState, bucket: &str, key: &str) -> HttpResponse {
    match state.objects.get(&(bucket.to_string(), key.to_string())) {
        Some(object) => object_response(object, status::OK),
        None => text(status::NOT_FOUND, "not found\n"),
    }
}

fn put_object(
    state: &mut NodeState,
    bucket: &str,
    key: &str,
    request: &HttpRequest,
    return_body: bool,
) -> HttpResponse {
    let meta: Headers = request
        .headers
        .iter()
        .filter(|(name, _)| {
            name.to_ascii_lowercase().starts_with(INDEX_HEADER_PREFIX)
                || name.eq_ignore_ascii_case(LINK_HEADER)
        })
        .collect();
    let sibling = StoredSibling {
        content_type: request
            .headers
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string(),
        meta,
        body: request.body.clone().unwrap_or_default(),
    };

    let allow_mult = state.allow_mult.contains(bucket);
    let vclock = state.next_vclock();
    let object_key = (bucket.to_string(), key.to_string());
    let object = match state.objects.remove(&object_key) {
        Some(mut existing)
            if allow_mult && request.headers.vclock() != Some(existing.vclock.as_str()) =>
        {
            existing.siblings.push(sibling);
            existing.vclock = vclock;
            existing
        }
        _ => StoredObject {
            vclock,
            siblings: vec![sibling],
        },
    };

    let response = if return_body {
        object_response(&object, status::OK)
    } else {
        HttpResponse::new(
            status::NO_CONTENT,
            Headers::new().with(VCLOCK_HEADER, object.vclock.as_str()),
            Bytes::new(),
        )
    };
    state.objects.insert(object_key, object);
    response
}

fn index_query(state: &NodeState, bucket: &str, index: &str, range: &[String]) -> HttpResponse {
    let header = format!("{INDEX_HEADER_PREFIX}{index}");
    let begin = range[0].as_str();
    let end = range.get(1).map(String::as_str);
    let numeric = index.ends_with("_int");

    let in_range = |value: &str| -> bool {
        if numeric {
            let (Ok(v), Ok(b)) = (value.trim().parse::<i64>(), begin.parse::<i64>()) else {
                return false;
            };
            match end.map(str::parse::<i64>) {
                Some(Ok(e)) => b <= v && v <= e,
                Some(Err(_)) => false,
                None => v == b,
            }
        } else {
            let value = value.trim();
            match end {
                Some(e) => begin <= value && value <= e,
                None => value == begin,
            }
        }
    };

    let keys: Vec<&str> = state
        .objects
        .iter()
        .filter(|((b, _), _)| b == bucket)
        .filter(|(_, object)| {
            object.siblings.iter().any(|s| {
                s.meta
                    .get(&header)
                    .map_or(false, |values| values.split(',').any(&in_range))
            })
        })
        .map(|((_, k), _)| k.as_str())
        .collect();

    HttpResponse::new(
        status::OK,
        Headers::new().with(CONTENT_TYPE_HEADER, "application/json"),
        json!({ "keys": keys }).to_string(),
    )
}

fn map_reduce(state: &NodeState, request: &HttpRequest) -> HttpResponse {
    let job: MapRedJob = match request
        .body
        .as_deref()
        .map(serde_json::from_slice::<MapRedJob>)
    {
        Some(Ok(job)) => job,
        _ => return text(400, "bad mapred job\n"),
    };

    let results: Vec<Json> = job
        .inputs
        .iter()
        .filter_map(|(bucket, key)| state.objects.get(&(bucket.clone(), key.clone())))
        .filter_map(|object| object.siblings.first())
        .map(|s| {
            serde_json::from_slice(&s.body)
                .unwrap_or_else(|_| Json::String(String::from_utf8_lossy(&s.body).into_owned()))
        })
        .collect();

    HttpResponse::new(
        status::OK,
        Headers::new().with(CONTENT_TYPE_HEADER, "application/json"),
        Json::Array(results).to_string(),
    )
}
