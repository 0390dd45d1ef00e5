//! Integration tests for the client against an in-memory node.

use riakc_client::protocol::{Method, Value};
use riakc_client::{ClientError, MutationHandle, RequestOptions};
use riakc_testkit::prelude::*;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn put_then_get_round_trips() {
    init_tracing();
    let cluster = TestCluster::new();

    let stored = cluster
        .put("users", "alice", json!({"name": "Alice", "age": 31}), RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(stored.status, 204);

    let fetched = cluster.get("users", "alice", RequestOptions::new()).await.unwrap();
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.value.get("name"), Some(&json!("Alice")));
    assert!(fetched.vclock().is_some());
}

#[tokio::test]
async fn put_with_return_body() {
    let cluster = TestCluster::new();
    let stored = cluster
        .put(
            "users",
            "bob",
            json!(["x"]),
            RequestOptions::new().with_return_body(true),
        )
        .await
        .unwrap();
    assert_eq!(stored.status, 200);
    assert_eq!(stored.value, Value::List(vec![json!("x")]));

    let put = &cluster.node.requests_with(Method::Put)[0];
    assert_eq!(put.path, "/riak/users/bob?returnbody=true");
}

#[tokio::test]
async fn raw_values_pass_through() {
    let cluster = TestCluster::new();
    cluster
        .put("blobs", "b1", Value::Raw(vec![0u8, 159, 146, 150].into()), RequestOptions::new().raw())
        .await
        .unwrap();

    let fetched = cluster.get("blobs", "b1", RequestOptions::new().raw()).await.unwrap();
    assert_eq!(fetched.value.as_raw().map(|b| b.to_vec()), Some(vec![0u8, 159, 146, 150]));
    assert_eq!(fetched.headers.content_type(), Some("application/octet-stream"));
}

#[tokio::test]
async fn missing_key_is_retried_once_then_returned() {
    let cluster = TestCluster::new();
    let response = cluster.get("users", "nobody", RequestOptions::new()).await.unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.value.get("statusCode"), Some(&json!(404)));
    assert_eq!(cluster.node.requests().len(), 2);
    assert_eq!(cluster.observer.counter("riak_retry_filter|404_GET"), 1);
}

#[tokio::test]
async fn missing_key_without_retry() {
    let cluster = TestCluster::new();
    let response = cluster
        .get("users", "nobody", RequestOptions::new().with_retry_on_not_found(false))
        .await
        .unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(cluster.node.requests().len(), 1);
}

#[tokio::test]
async fn read_after_write_race_recovers() {
    let cluster = TestCluster::new();
    cluster.put("users", "carol", json!({}), RequestOptions::new()).await.unwrap();
    cluster.node.inject(Fault::status(404).on(Method::Get));

    let response = cluster.get("users", "carol", RequestOptions::new()).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(cluster.observer.counter("riak_retry_recover|users"), 1);
}

#[tokio::test]
async fn server_errors_are_retried() {
    let cluster = TestCluster::new();
    cluster.put("users", "dave", json!({"n": 1}), RequestOptions::new()).await.unwrap();
    cluster.node.inject_many(Fault::status(500).on(Method::Get), 3);

    let response = cluster.get("users", "dave", RequestOptions::new()).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(cluster.observer.counter("riak_retry_filter|500"), 3);
    assert_eq!(cluster.observer.retries().len(), 3);
    assert_eq!(cluster.observer.counter("riak_retry_path|users"), 3);
}

#[tokio::test]
async fn exhausted_retries_return_last_response_as_data() {
    let cluster = TestCluster::new();
    cluster.node.inject_many(Fault::status(500), 5);

    let response = cluster.get("users", "erin", RequestOptions::new()).await.unwrap();
    assert_eq!(response.status, 500);
    assert_eq!(response.value.get("statusCode"), Some(&json!(500)));
    assert_eq!(cluster.node.requests().len(), 5);
}

#[tokio::test]
async fn forbidden_writes_are_retried() {
    let cluster = TestCluster::new();
    cluster.node.inject(Fault::status(403).on(Method::Put));

    let response = cluster.put("users", "fay", json!({}), RequestOptions::new()).await.unwrap();
    assert_eq!(response.status, 204);
    assert_eq!(cluster.observer.counter("riak_retry_filter|403_PUT"), 1);
}

#[tokio::test]
async fn transport_failures_mark_node_unhealthy() {
    let cluster = TestCluster::new();
    cluster.node.inject_many(Fault::transport("connection refused"), 5);

    let err = cluster.get("users", "gus", RequestOptions::new()).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("connection refused"));

    cluster.put("users", "gus", json!({}), RequestOptions::new()).await.unwrap();
    let health: Vec<bool> = cluster
        .observer
        .health_changes()
        .iter()
        .map(|e| e.healthy)
        .collect();
    assert_eq!(health, vec![false, true]);
    assert_eq!(cluster.observer.counter("riak_pool_health_change"), 2);
    assert!(!cluster.observer.histograms("LB_fail_riak_user|GET|users").is_empty());
}

#[tokio::test]
async fn timing_is_reported_per_request() {
    let cluster = TestCluster::new();
    cluster.put("users", "hal", json!({}), RequestOptions::new()).await.unwrap();
    cluster.get("users", "hal", RequestOptions::new()).await.unwrap();

    assert_eq!(cluster.observer.histograms("LB_Pool_riak_user|PUT|users").len(), 1);
    assert_eq!(cluster.observer.histograms("LB_Pool_riak_user|GET|users").len(), 1);
}

#[tokio::test]
async fn modify_creates_missing_key() {
    let cluster = TestCluster::new();
    let response = cluster
        .modify(
            "counters",
            "visits",
            |current: Value, handle: MutationHandle| {
                assert!(current.is_absent());
                handle.commit(json!({"counter": 1}));
            },
            RequestOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 204);
    assert_eq!(response.value.get("counter"), Some(&json!(1)));
    assert_eq!(cluster.node.stored_json("counters", "visits"), Some(json!({"counter": 1})));
}

#[tokio::test]
async fn modify_increments_existing_value_with_vclock() {
    let cluster = TestCluster::new();
    cluster
        .put("counters", "visits", json!({"counter": 41}), RequestOptions::new())
        .await
        .unwrap();
    let vclock = cluster.node.vclock("counters", "visits");

    cluster
        .modify(
            "counters",
            "visits",
            |current: Value, handle: MutationHandle| {
                let n = current.get("counter").and_then(|v| v.as_i64()).unwrap_or(0);
                handle.commit(json!({ "counter": n + 1 }));
            },
            RequestOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(cluster.node.stored_json("counters", "visits"), Some(json!({"counter": 42})));
    let puts = cluster.node.requests_with(Method::Put);
    assert_eq!(puts[1].headers.vclock(), vclock.as_deref());
}

#[tokio::test]
async fn modify_may_complete_later() {
    let cluster = TestCluster::new();
    let response = cluster
        .modify(
            "jobs",
            "j1",
            |_current: Value, handle: MutationHandle| {
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    handle.commit("done");
                });
            },
            RequestOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(response.value, Value::text("done"));
}

#[tokio::test]
async fn modify_reports_read_failures() {
    let cluster = TestCluster::with_config(|config| {
        config.with_retry(riakc_client::RetryConfig::no_retry())
    });
    cluster.node.inject(Fault::status(503).on(Method::Get));

    let err = cluster
        .replace("users", "ivy", "x", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 503, .. }));
    assert!(cluster.node.requests_with(Method::Put).is_empty());
}

#[tokio::test]
async fn replace_overwrites() {
    let cluster = TestCluster::new();
    cluster.put("bucket", "k", "OLD", RequestOptions::new()).await.unwrap();

    let response = cluster.replace("bucket", "k", "NEW", RequestOptions::new()).await.unwrap();
    assert_eq!(response.status, 204);

    let fetched = cluster.get("bucket", "k", RequestOptions::new()).await.unwrap();
    assert_eq!(fetched.value.as_str(), Some("NEW"));
}

#[tokio::test]
async fn append_builds_list_and_is_idempotent() {
    let cluster = TestCluster::new();
    cluster.append("lists", "l", "a", RequestOptions::new()).await.unwrap();
    cluster.append("lists", "l", "b", RequestOptions::new()).await.unwrap();

    let response = cluster.append("lists", "l", "a", RequestOptions::new()).await.unwrap();
    assert_eq!(response.status, 204);
    assert_eq!(response.value, Value::List(vec![json!("a"), json!("b")]));

    assert_eq!(cluster.node.stored_json("lists", "l"), Some(json!(["a", "b"])));
    assert_eq!(cluster.node.requests_with(Method::Put).len(), 2);
}

#[tokio::test]
async fn append_rejects_non_lists() {
    let cluster = TestCluster::new();
    cluster.put("lists", "doc", json!({"a": 1}), RequestOptions::new()).await.unwrap();

    let err = cluster.append("lists", "doc", "x", RequestOptions::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Integrity { .. }));
    assert_eq!(cluster.node.stored_json("lists", "doc"), Some(json!({"a": 1})));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_operations_each_resolve_once() {
    let cluster = Arc::new(TestCluster::new());
    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let cluster = Arc::clone(&cluster);
            tokio::spawn(async move {
                cluster
                    .append("lists", &format!("key_{i}"), i, RequestOptions::new())
                    .await
            })
        })
        .collect();

    for task in tasks {
        let response = task.await.unwrap().unwrap();
        assert_eq!(response.status, 204);
    }
    for i in 0..16 {
        assert_eq!(cluster.node.stored_json("lists", &format!("key_{i}")), Some(json!([i])));
    }
}

#[tokio::test]
async fn delete_removes_object() {
    let cluster = TestCluster::new();
    cluster.put("users", "jo", json!({}), RequestOptions::new()).await.unwrap();

    let response = cluster.delete("users", "jo").await.unwrap();
    assert_eq!(response.status, 204);

    let delete = &cluster.node.requests_with(Method::Delete)[0];
    assert_eq!(delete.headers.get("connection"), Some("close"));
    assert_eq!(delete.headers.get("x-riak-clientid"), Some("testkit-client"));

    let response = cluster.delete("users", "jo").await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(cluster.node.requests_with(Method::Delete).len(), 2);
}

#[tokio::test]
async fn secondary_index_lookup() {
    let cluster = TestCluster::new();
    for (key, email) in [("kim", "kim@example.com"), ("lee", "lee@example.com")] {
        let options = RequestOptions::new().with_header("x-riak-index-email_bin", email);
        cluster.put("users", key, json!({"email": email}), options).await.unwrap();
    }

    let exact = cluster
        .index("users", "email_bin", "lee@example.com", None)
        .await
        .unwrap();
    assert_eq!(exact.keys, vec!["lee"]);

    let range = cluster
        .index("users", "email_bin", "a", Some("z"))
        .await
        .unwrap();
    assert_eq!(range.keys, vec!["kim", "lee"]);
}

#[tokio::test]
async fn mapred_post() {
    let cluster = TestCluster::new();
    cluster.put("docs", "d1", json!({"n": 1}), RequestOptions::new()).await.unwrap();
    cluster.put("docs", "d2", json!({"n": 2}), RequestOptions::new()).await.unwrap();

    let job = json!({"inputs": [["docs", "d1"], ["docs", "d2"]], "query": []});
    let response = cluster.post("/mapred", &job).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.value, Value::List(vec![json!({"n": 1}), json!({"n": 2})]));

    let response = cluster.post("/mapred", &json!({"bogus": true})).await.unwrap();
    assert_eq!(response.status, 400);
    assert_eq!(response.value.get("error"), Some(&json!("non-JSON: bad mapred job\n")));
}
