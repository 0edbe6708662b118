#![allow(clippy::unwrap_used)]
// Integration tests for `CountingClient` using wiremock.

use chrono::{TimeZone, Utc};
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eventstat_api::{
    CountingClient, Error, EventsCountStatus, EventsNamespace, EventsQuery, Granularity, TlsMode,
    TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CountingClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = CountingClient::with_client(reqwest::Client::new(), &base_url, None).unwrap();
    (server, client)
}

fn day_query() -> EventsQuery {
    EventsQuery::new(
        "p1",
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
        Granularity::Day,
    )
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_event_counts() {
    let (server, client) = setup().await;

    let envelope = json!({
        "status": "ok",
        "data": [
            { "key": "2024-01-01T00:00:00Z", "events": 10 },
            { "key": "2024-01-03T00:00:00.000Z", "events": 4 }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .and(query_param("project_id", "p1"))
        .and(query_param("start", "2024-01-01T00:00:00.000Z"))
        .and(query_param("end", "2024-01-03T00:00:00.000Z"))
        .and(query_param("granularity", "day"))
        .and(query_param_is_missing("namespace"))
        .and(query_param_is_missing("status"))
        .and(query_param_is_missing("destination_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .expect(1)
        .mount(&server)
        .await;

    let points = client.get_event_counts(&day_query()).await.unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].key, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(points[0].events, 10);
    assert_eq!(points[1].key, Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
    assert_eq!(points[1].events, 4);
}

#[tokio::test]
async fn test_optional_params_are_sent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .and(query_param("namespace", "destination"))
        .and(query_param("status", "errors"))
        .and(query_param("destination_id", "dst-7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "data": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let query = day_query()
        .namespace(EventsNamespace::Destination)
        .status(EventsCountStatus::Errors)
        .destination_id("dst-7");
    let points = client.get_event_counts(&query).await.unwrap();

    assert!(points.is_empty());
}

#[tokio::test]
async fn test_missing_data_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let points = client.get_event_counts(&day_query()).await.unwrap();
    assert!(points.is_empty());
}

#[tokio::test]
async fn test_custom_endpoint_path() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/console", server.uri())).unwrap();
    let client =
        CountingClient::with_client(reqwest::Client::new(), &base_url, Some("/stats/events"))
            .unwrap();

    Mock::given(method("GET"))
        .and(path("/console/stats/events"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "data": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.get_event_counts(&day_query()).await.unwrap();
}

#[tokio::test]
async fn test_bearer_token_header() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let transport = TransportConfig::default()
        .with_bearer_token(SecretString::from("s3cret".to_string()));
    let client = CountingClient::new(&base_url, None, &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "data": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.get_event_counts(&day_query()).await.unwrap();
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_backend_failure_status() {
    let (server, client) = setup().await;

    let body = json!({ "status": "error", "error": "clickhouse unavailable" });

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let result = client.get_event_counts(&day_query()).await;

    match result {
        Err(Error::Backend {
            ref status,
            ref message,
            ref body,
        }) => {
            assert_eq!(status, "error");
            assert_eq!(message, "clickhouse unavailable");
            assert!(body.contains("clickhouse unavailable"));
        }
        other => panic!("expected Backend error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_backend_failure_with_structured_error() {
    let (server, client) = setup().await;

    let body = json!({
        "status": "error",
        "message": "query failed",
        "error": { "code": "TIMEOUT_EXCEEDED", "elapsed_ms": 30000 }
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let result = client.get_event_counts(&day_query()).await;

    match result {
        Err(Error::Backend {
            ref message,
            ref body,
            ..
        }) => {
            assert_eq!(message, "query failed");
            assert!(body.contains("TIMEOUT_EXCEEDED"));
        }
        other => panic!("expected Backend error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_request_timeout_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ok", "data": [] }))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let transport = TransportConfig {
        timeout: std::time::Duration::from_millis(100),
        ..TransportConfig::default()
    };
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = CountingClient::new(&base_url, None, &transport).unwrap();

    let err = client.get_event_counts(&day_query()).await.unwrap_err();

    match err {
        Error::Transport(ref e) => assert!(e.is_timeout(), "expected timeout, got: {e:?}"),
        ref other => panic!("expected Transport error, got: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get_event_counts(&day_query()).await;

    let err = result.unwrap_err();
    assert!(err.is_auth_failure(), "expected auth failure, got: {err:?}");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client.get_event_counts(&day_query()).await.unwrap_err();

    assert!(
        matches!(err, Error::Http { status: 503, .. }),
        "expected Http 503, got: {err:?}"
    );
    assert!(err.is_transient());
    assert_eq!(err.raw_body(), Some("upstream down"));
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.get_event_counts(&day_query()).await;

    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body == "<html>oops</html>"),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_points() {
    let (server, client) = setup().await;

    let envelope = json!({
        "status": "ok",
        "data": [{ "key": "not a date", "events": 1 }]
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let result = client.get_event_counts(&day_query()).await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Transport ───────────────────────────────────────────────────────

#[test]
fn test_missing_ca_cert() {
    let dir = tempfile::tempdir().unwrap();
    let transport = TransportConfig {
        tls: TlsMode::CustomCa(dir.path().join("missing.pem")),
        ..TransportConfig::default()
    };

    let err = transport.build_client().unwrap_err();
    assert!(matches!(err, Error::Tls(ref msg) if msg.contains("failed to read CA cert")));
}
