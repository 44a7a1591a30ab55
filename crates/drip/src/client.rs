use actions_client::{RequestBuilder, RequestClient, RequestMethod, Response, SfHttpClient};
use serde::Serialize;
use tracing::instrument;

use crate::error::{Error, ErrorKind, Result};
use crate::payload::{BatchesBody, IdentifyPayload, SubscribersBody, TrackEventPayload};
use crate::settings::DripSettings;

/// Drip REST client for one account.
#[derive(Debug, Clone)]
pub struct DripClient<C = SfHttpClient> {
    settings: DripSettings,
    request: C,
}

impl<C: RequestClient> DripClient<C> {
    pub fn new(settings: DripSettings, request: C) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings, request })
    }

    pub fn settings(&self) -> &DripSettings {
        &self.settings
    }

    /// Record an event. The payload needs a user id or an anonymous id.
    #[instrument(skip(self, payload), fields(event = %payload.event))]
    pub async fn track_event(&self, payload: &TrackEventPayload) -> Result<Response> {
        if !payload.has_identity() {
            return Err(Error::new(ErrorKind::MissingIdentity));
        }
        self.post("events", &payload.formatted()).await
    }

    /// Create or update one subscriber.
    #[instrument(skip(self, payload))]
    pub async fn identify(&self, payload: &IdentifyPayload) -> Result<Response> {
        let body = SubscribersBody {
            subscribers: std::slice::from_ref(payload),
        };
        self.post("subscribers", &body).await
    }

    /// Create or update subscribers in one batch call.
    #[instrument(skip(self, payloads), fields(batch_size = payloads.len()))]
    pub async fn identify_batch(&self, payloads: &[IdentifyPayload]) -> Result<Response> {
        let body = BatchesBody {
            batches: [SubscribersBody {
                subscribers: payloads,
            }],
        };
        self.post("subscribers/batches", &body).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let request = RequestBuilder::new(RequestMethod::Post, self.settings.account_url(path))
            .header("Authorization", self.settings.authorization())
            .json(body)?;
        Ok(self.request.execute(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actions_client::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{any, body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, DripClient) {
        let mock_server = MockServer::start().await;
        let settings =
            DripSettings::new("key", "2445926").with_endpoint(format!("{}/v2", mock_server.uri()));
        let request = SfHttpClient::new(ClientConfig::builder().without_retry().build()).unwrap();
        let client = DripClient::new(settings, request).unwrap();
        (mock_server, client)
    }

    fn event() -> TrackEventPayload {
        TrackEventPayload {
            event: "Test Event".into(),
            user_id: Some("user123".into()),
            properties: json!({"revenue": 19.99, "currency": "USD"}),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_track_event() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/2445926/events"))
            .and(header("Authorization", "Basic a2V5Og=="))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({
                "event": "Test Event",
                "properties": {"revenue": 19.99, "currency": "USD"},
                "userId": "user123"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let response = client.track_event(&event()).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_track_event_requires_identity() {
        let (server, client) = setup().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let payload = TrackEventPayload {
            user_id: None,
            ..event()
        };
        let err = client.track_event(&payload).await.unwrap_err();
        assert_eq!(err.to_string(), "Either userId or anonymousId must be defined");
    }

    #[tokio::test]
    async fn test_track_event_api_error() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/2445926/events"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "Internal Server Error"})),
            )
            .mount(&server)
            .await;

        let err = client.track_event(&event()).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("Internal Server Error"));
    }

    #[tokio::test]
    async fn test_identify() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/2445926/subscribers"))
            .and(body_json(json!({
                "subscribers": [{
                    "email": "test@example.com",
                    "custom_fields": {"fizz": "buzz"},
                    "ip_address": "127.0.0.1",
                    "new_email": "test2@example.com",
                    "sms_number": "1234567890",
                    "status": "unsubscribed",
                    "status_updated_at": "2021-01-01T00:00:00Z",
                    "tags": "tag1,tag2",
                    "time_zone": "Europe/Amsterdam"
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let payload = IdentifyPayload {
            email: "test@example.com".into(),
            custom_fields: json!({"fizz": "buzz"}).as_object().cloned(),
            ip_address: Some("127.0.0.1".into()),
            new_email: Some("test2@example.com".into()),
            sms_number: Some("1234567890".into()),
            status: Some("unsubscribed".into()),
            status_updated_at: Some("2021-01-01T00:00:00Z".into()),
            tags: Some("tag1,tag2".into()),
            time_zone: Some("Europe/Amsterdam".into()),
        };
        client.identify(&payload).await.unwrap();
    }

    #[tokio::test]
    async fn test_identify_batch() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/2445926/subscribers/batches"))
            .and(body_json(json!({
                "batches": [{
                    "subscribers": [
                        {"email": "foo@bar.com", "status": "unsubscribed"},
                        {"email": "baz@bar.com"}
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let payloads = vec![
            IdentifyPayload {
                email: "foo@bar.com".into(),
                status: Some("unsubscribed".into()),
                ..Default::default()
            },
            IdentifyPayload {
                email: "baz@bar.com".into(),
                ..Default::default()
            },
        ];
        let response = client.identify_batch(&payloads).await.unwrap();
        assert_eq!(response.status(), 201);
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let request = SfHttpClient::default_client().unwrap();
        let err = DripClient::new(DripSettings::new("", "1"), request).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidSettings(_)));
    }
}
