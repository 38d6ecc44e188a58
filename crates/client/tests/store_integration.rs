// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runs the client against an in-process mock of the store's HTTP API.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::{get, post},
};
use vmgeo_client::{ClientError, ErrorKind, LocationWrite, QueryWindow, RestClient};

/// What the mock answers to queries
#[derive(Clone)]
enum QueryMode {
    /// Serve back whatever was written, as a `j` series per write
    Echo,
    /// Serve a fixed status and body
    Fixed(StatusCode, &'static str),
}

#[derive(Clone)]
struct MockStore {
    write_status: StatusCode,
    write_body:   &'static str,
    query_mode:   QueryMode,
    writes:       Arc<Mutex<Vec<(Option<String>, String)>>>,
    queries:      Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl MockStore {
    fn new() -> Self {
        Self {
            write_status: StatusCode::NO_CONTENT,
            write_body:   "",
            query_mode:   QueryMode::Echo,
            writes:       Arc::default(),
            queries:      Arc::default(),
        }
    }
}

async fn write_handler(
    State(store): State<MockStore>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    store.writes.lock().unwrap().push((content_type, body));
    (store.write_status, store.write_body)
}

async fn query_handler(
    State(store): State<MockStore>,
    Query(params): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    store.queries.lock().unwrap().push(params);

    let (status, body) = match &store.query_mode {
        QueryMode::Fixed(status, body) => (*status, body.to_string()),
        QueryMode::Echo => (StatusCode::OK, echo_body(&store)),
    };
    (status, [(CONTENT_TYPE, "application/json")], body)
}

/// Builds a matrix response with one `[u_ts seconds, j]` row per written line
fn echo_body(store: &MockStore) -> String {
    let writes = store.writes.lock().unwrap();
    let mut series = Vec::new();
    for (_, line) in writes.iter() {
        let (tags, fields) = line.trim_end().split_once(' ').unwrap();
        let tag = |name: &str| {
            tags.split(',')
                .find_map(|kv| kv.strip_prefix(&format!("{name}=")))
                .unwrap()
                .to_string()
        };
        let j = fields
            .split(',')
            .find_map(|kv| kv.strip_prefix("j="))
            .unwrap();
        let u_ts: f64 = tag("u_ts").parse().unwrap();
        series.push(serde_json::json!({
            "metric": {"__name__": "j", "user_id": tag("user_id")},
            "values": [[u_ts / 1000.0, j]],
        }));
    }
    serde_json::json!({
        "status": "success",
        "data": {"resultType": "matrix", "result": series},
    })
    .to_string()
}

async fn spawn_store(store: MockStore) -> String {
    let router = Router::new()
        .route("/api/v2/write", post(write_handler))
        .route("/api/v1/query_range", get(query_handler))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_write_then_query_round_trip() {
    let store = MockStore::new();
    let url = spawn_store(store.clone()).await;
    let client = RestClient::new(&url).unwrap();

    let collect_ts = 1_700_000_010_000_i64;
    let event_ts = collect_ts - 10_000;
    client
        .write_location(&LocationWrite::new("333", event_ts, collect_ts, 111.11, 111.11))
        .await
        .unwrap();

    {
        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0.as_deref(), Some("text/plain"));
        assert_eq!(
            writes[0].1,
            "t_zbs,user_id=333,u_ts=1700000000000 j=111.110000,w=111.110000\n"
        );
    }

    let window = QueryWindow::builder()
        .user_id("333")
        .start_ms(collect_ts - 10_800_000)
        .end_ms(collect_ts)
        .step_secs(8_640_000)
        .build();
    let outcome = client.query_range(&window).await.unwrap();

    assert_eq!(outcome.skipped, 0);
    assert_eq!(outcome.samples.len(), 1);
    let sample = &outcome.samples[0];
    assert_eq!(sample.user_id, "333");
    assert_eq!(sample.timestamp, event_ts);
    assert!((sample.longitude - 111.11).abs() < 1e-9);
}

#[tokio::test]
async fn test_query_params_sent_in_seconds() {
    let store = MockStore {
        query_mode: QueryMode::Fixed(
            StatusCode::OK,
            r#"{"status":"success","data":{"resultType":"matrix","result":[]}}"#,
        ),
        ..MockStore::new()
    };
    let url = spawn_store(store.clone()).await;
    let client = RestClient::new(&url).unwrap();

    let window = QueryWindow::builder()
        .user_id("333")
        .start_ms(0)
        .end_ms(10_800_000)
        .step_secs(8_640_000)
        .build();
    let outcome = client.query_range(&window).await.unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.skipped, 0);

    let queries = store.queries.lock().unwrap();
    assert_eq!(
        queries[0],
        vec![
            ("query".to_string(), r#"j{user_id="333"}"#.to_string()),
            ("start".to_string(), "0".to_string()),
            ("end".to_string(), "10800".to_string()),
            ("step".to_string(), "8640000".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_write_rejected_carries_body() {
    let store = MockStore {
        write_status: StatusCode::INTERNAL_SERVER_ERROR,
        write_body: "cannot parse line",
        ..MockStore::new()
    };
    let url = spawn_store(store).await;
    let client = RestClient::new(&url).unwrap();

    let err = client
        .write_location(&LocationWrite::new("333", 1, 1, 1.0, 1.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    match err {
        ClientError::WriteRejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "cannot parse line");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_write_rejected_with_broken_body_stays_protocol_error() {
    // Sends the 500 head and a first chunk, then aborts the body
    async fn broken_write() -> impl IntoResponse {
        let head = futures::stream::once(async { Ok(Bytes::from_static(b"partial")) });
        let abort = futures::stream::once(async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Err(std::io::Error::other("connection dropped"))
        });
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Body::from_stream(futures::StreamExt::chain(head, abort)),
        )
    }

    let router = Router::new().route("/api/v2/write", post(broken_write));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = RestClient::new(format!("http://{addr}")).unwrap();
    let err = client
        .write_location(&LocationWrite::new("333", 1, 1, 1.0, 1.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(matches!(err, ClientError::WriteRejected { status: 500, .. }));
}

#[tokio::test]
async fn test_malformed_rows_are_counted() {
    let store = MockStore {
        query_mode: QueryMode::Fixed(
            StatusCode::OK,
            r#"{"status":"success","data":{"resultType":"matrix","result":[
                {"metric":{"user_id":"333"},"values":[[1700000000,"1.5"],[1700000001,"x"],[1700000002]]},
                {"metric":{"user_id":"333"},"values":[[1700000003,"2.5"]]}
            ]}}"#,
        ),
        ..MockStore::new()
    };
    let url = spawn_store(store).await;
    let client = RestClient::new(&url).unwrap();

    let window = QueryWindow::builder().user_id("333").start_ms(0).end_ms(1).build();
    let outcome = client.query_range(&window).await.unwrap();

    assert_eq!(outcome.skipped, 2);
    let values: Vec<_> = outcome.samples.iter().map(|s| s.longitude).collect();
    assert_eq!(values, vec![1.5, 2.5]);
}

#[tokio::test]
async fn test_query_error_status_surfaces_store_message() {
    let store = MockStore {
        query_mode: QueryMode::Fixed(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"status":"error","errorType":"422","error":"cannot parse query"}"#,
        ),
        ..MockStore::new()
    };
    let url = spawn_store(store).await;
    let client = RestClient::new(&url).unwrap();

    let window = QueryWindow::builder().user_id("333").start_ms(0).end_ms(1).build();
    let err = client.query_range(&window).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(err.to_string().contains("cannot parse query"));
}

#[tokio::test]
async fn test_non_json_body_is_protocol_error() {
    let store = MockStore {
        query_mode: QueryMode::Fixed(StatusCode::BAD_GATEWAY, "upstream unavailable"),
        ..MockStore::new()
    };
    let url = spawn_store(store).await;
    let client = RestClient::new(&url).unwrap();

    let window = QueryWindow::builder().user_id("333").start_ms(0).end_ms(1).build();
    let err = client.query_range(&window).await.unwrap_err();
    assert!(matches!(err, ClientError::Json { .. }));
}

#[tokio::test]
async fn test_unreachable_store_is_request_error() {
    // Grab a free port and release it so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RestClient::new(format!("http://{addr}")).unwrap();
    let err = client
        .write_location(&LocationWrite::new("333", 1, 1, 1.0, 1.0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Request);
}
