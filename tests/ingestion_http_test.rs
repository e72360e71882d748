//! HTTP transport tests against a mock ingestion endpoint.

use std::time::Duration;

use glimt::{Config, DeliveryError, Glimt, IngestionClient, Sink, Trace};
use glimt_testing::fixtures;
use wiremock::matchers::{basic_auth, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config::new("pk-test", "sk-test", server.uri())
}

#[tokio::test]
async fn posts_batch_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/public/ingestion"))
        .and(basic_auth("pk-test", "sk-test"))
        .respond_with(ResponseTemplate::new(207).set_body_json(serde_json::json!({
            "successes": [{"id": "e-1", "status": 201}],
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = IngestionClient::new(&config_for(&server)).unwrap();
    let batch = vec![fixtures::trace_event("checkout")];
    client.send(&batch).await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn batch_body_contains_event_envelopes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/public/ingestion"))
        .and(body_partial_json(serde_json::json!({
            "batch": [{"type": "trace-create", "body": {"name": "checkout"}}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = IngestionClient::new(&config_for(&server)).unwrap();
    client.send(&[fixtures::trace_event("checkout")]).await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn server_errors_map_to_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = IngestionClient::new(&config_for(&server)).unwrap();
    let result = client.send(&[fixtures::trace_event("x")]).await;

    assert!(matches!(result, Err(DeliveryError::ServerError { status_code: 503 })));
}

#[tokio::test]
async fn client_errors_map_to_client_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = IngestionClient::new(&config_for(&server)).unwrap();
    let result = client.send(&[fixtures::trace_event("x")]).await;

    assert!(matches!(result, Err(DeliveryError::ClientError { status_code: 401 })));
}

#[tokio::test]
async fn unreachable_host_maps_to_network_error() {
    // Reserved TEST-NET-1 address; nothing listens there.
    let config = Config {
        request_timeout: Duration::from_millis(250),
        ..Config::new("pk", "sk", "http://192.0.2.1:9")
    };

    let client = IngestionClient::new(&config).unwrap();
    let result = client.send(&[fixtures::trace_event("x")]).await;

    assert!(matches!(result, Err(DeliveryError::Network { .. } | DeliveryError::Timeout)));
}

#[tokio::test]
async fn full_client_delivers_through_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/public/ingestion"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        flush_interval: Duration::from_secs(3600),
        ..config_for(&server)
    };
    let client = Glimt::new(config).unwrap();
    client.trace(Trace { name: Some("over-http".into()), ..Default::default() }).await.unwrap();
    client.shutdown().await;

    server.verify().await;
}

#[tokio::test]
async fn failed_batches_are_retried_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        flush_interval: Duration::from_millis(10),
        ..config_for(&server)
    };
    let client = Glimt::new(config).unwrap();
    client.trace(Trace::default()).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while server.received_requests().await.map_or(0, |r| r.len()) < 2 {
        assert!(tokio::time::Instant::now() < deadline, "expected a retry after the 500");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    client.shutdown().await;

    server.verify().await;
}
