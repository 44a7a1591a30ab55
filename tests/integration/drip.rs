//! Drip destination pipelines against a mock API.

use destination_actions::drip::{DripClient, DripSettings, IdentifyPayload, TrackEventPayload};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{fast_retry_client, init_tracing, no_retry_client};

fn settings(server: &MockServer) -> DripSettings {
    init_tracing();
    serde_json::from_value(json!({
        "apiKey": "key",
        "endpoint": format!("{}/v2/", server.uri()),
        "accountId": "2445926"
    }))
    .expect("settings JSON should deserialize")
}

#[tokio::test]
async fn test_track_then_identify() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/2445926/events"))
        .and(header("Authorization", "Basic a2V5Og=="))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/2445926/subscribers"))
        .and(header("Authorization", "Basic a2V5Og=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"subscribers": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = DripClient::new(settings(&server), no_retry_client()).unwrap();

    client
        .track_event(&TrackEventPayload {
            event: "Order Completed".into(),
            anonymous_id: Some("anon-7".into()),
            properties: json!(["not", "an", "object"]),
            ..Default::default()
        })
        .await
        .unwrap();

    client
        .identify(&IdentifyPayload {
            email: "test@example.com".into(),
            time_zone: Some("Europe/Amsterdam".into()),
            ..Default::default()
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_batch_identify_retries_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/2445926/subscribers/batches"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/2445926/subscribers/batches"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = DripClient::new(settings(&server), fast_retry_client(2)).unwrap();
    let payloads = vec![IdentifyPayload {
        email: "foo@bar.com".into(),
        ..Default::default()
    }];

    let response = client.identify_batch(&payloads).await.unwrap();
    assert_eq!(response.status(), 201);
}
