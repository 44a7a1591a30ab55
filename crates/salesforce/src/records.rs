//! Single-record create, update, upsert and delete.

use actions_client::{RequestBuilder, RequestClient, RequestMethod, Response};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::client::Salesforce;
use crate::error::{Error, ErrorKind, Result};
use crate::payload::{GenericPayload, RecordOperation};
use crate::shape::build_json_data;
use crate::soql::SoqlOperator;

impl<C: RequestClient> Salesforce<C> {
    /// Run the operation named by the payload's `operation` field.
    pub async fn perform(&self, payload: &GenericPayload, sobject: &str) -> Result<Response> {
        match payload.record_operation()? {
            RecordOperation::Create => self.create_record(payload, sobject).await,
            RecordOperation::Update => self.update_record(payload, sobject).await,
            RecordOperation::Upsert => self.upsert_record(payload, sobject).await,
            RecordOperation::Delete => self.delete_record(payload, sobject).await,
        }
    }

    /// POST a new record built from the payload.
    #[instrument(skip(self, payload))]
    pub async fn create_record(&self, payload: &GenericPayload, sobject: &str) -> Result<Response> {
        let body = Value::Object(build_json_data(payload, sobject));
        let request =
            RequestBuilder::new(RequestMethod::Post, self.sobject_url(sobject)).json_value(body);
        Ok(self.request.execute(request).await?)
    }

    /// PATCH the record named by an `Id` trait, or the one the traits resolve to.
    #[instrument(skip(self, payload))]
    pub async fn update_record(&self, payload: &GenericPayload, sobject: &str) -> Result<Response> {
        let traits = required_traits(payload, RecordOperation::Update)?;
        let record_id = self.resolve_record_id(payload, traits, sobject).await?;
        self.base_update(&record_id, sobject, payload).await
    }

    /// Update the record the traits resolve to, or create one when none matches.
    ///
    /// An `Id` trait is not used as a shortcut here; the lookup always runs.
    #[instrument(skip(self, payload))]
    pub async fn upsert_record(&self, payload: &GenericPayload, sobject: &str) -> Result<Response> {
        let traits = required_traits(payload, RecordOperation::Upsert)?;
        let operator = SoqlOperator::parse(payload.record_matcher_operator.as_deref())?;

        match self.lookup_traits(traits, sobject, operator).await {
            Ok(record_id) => self.base_update(&record_id, sobject, payload).await,
            Err(err) if err.is_record_not_found() => {
                debug!("No record matched, creating one");
                self.create_record(payload, sobject).await
            }
            Err(err) => Err(err),
        }
    }

    /// DELETE the record named by an `Id` trait, or the one the traits resolve to.
    #[instrument(skip(self, payload))]
    pub async fn delete_record(&self, payload: &GenericPayload, sobject: &str) -> Result<Response> {
        let traits = required_traits(payload, RecordOperation::Delete)?;
        let record_id = self.resolve_record_id(payload, traits, sobject).await?;
        let request = RequestBuilder::new(
            RequestMethod::Delete,
            self.record_url(sobject, &record_id),
        );
        Ok(self.request.execute(request).await?)
    }

    async fn resolve_record_id(
        &self,
        payload: &GenericPayload,
        traits: &Map<String, Value>,
        sobject: &str,
    ) -> Result<String> {
        if let Some(id) = explicit_id(traits) {
            return Ok(id);
        }
        let operator = SoqlOperator::parse(payload.record_matcher_operator.as_deref())?;
        self.lookup_traits(traits, sobject, operator).await
    }

    async fn base_update(
        &self,
        record_id: &str,
        sobject: &str,
        payload: &GenericPayload,
    ) -> Result<Response> {
        let body = Value::Object(build_json_data(payload, sobject));
        let request = RequestBuilder::new(RequestMethod::Patch, self.record_url(sobject, record_id))
            .json_value(body);
        Ok(self.request.execute(request).await?)
    }
}

fn required_traits(payload: &GenericPayload, operation: RecordOperation) -> Result<&Map<String, Value>> {
    payload
        .non_empty_traits()
        .ok_or_else(|| Error::new(ErrorKind::UndefinedTraits(operation.as_str())))
}

/// A truthy `Id` trait, as a string.
fn explicit_id(traits: &Map<String, Value>) -> Option<String> {
    match traits.get("Id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actions_client::{ClientConfig, SfHttpClient};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, Salesforce) {
        let mock_server = MockServer::start().await;
        let request = SfHttpClient::new(ClientConfig::builder().without_retry().build()).unwrap();
        let sf = Salesforce::new(&mock_server.uri(), request).unwrap();
        (mock_server, sf)
    }

    fn lead(traits: Value) -> GenericPayload {
        GenericPayload {
            traits: traits.as_object().cloned(),
            last_name: Some("Smith".into()),
            company: Some("Acme".into()),
            ..Default::default()
        }
    }

    async fn mount_lookup(server: &MockServer, body: Value) {
        Mock::given(method("GET"))
            .and(path("/services/data/v53.0/query/"))
            .and(query_param("q", "SELECT Id FROM Lead WHERE email = 'a@b.com'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_create_posts_derived_fields() {
        let (server, sf) = setup().await;

        Mock::given(method("POST"))
            .and(path("/services/data/v53.0/sobjects/Lead"))
            .and(body_json(json!({"LastName": "Smith", "Company": "Acme"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "00Q1", "success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let response = sf.create_record(&lead(json!({})), "Lead").await.unwrap();
        assert_eq!(response.status(), 201);
    }

    #[tokio::test]
    async fn test_update_with_explicit_id_skips_lookup() {
        let (server, sf) = setup().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/services/data/v53.0/sobjects/Lead/00Q9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let response = sf
            .update_record(&lead(json!({"Id": "00Q9", "email": "a@b.com"})), "Lead")
            .await
            .unwrap();
        assert_eq!(response.status(), 204);
    }

    #[tokio::test]
    async fn test_update_propagates_lookup_failure() {
        let (server, sf) = setup().await;
        mount_lookup(&server, json!({"totalSize": 2, "records": []})).await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let err = sf
            .update_record(&lead(json!({"email": "a@b.com"})), "Lead")
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MultipleRecordsFound));
    }

    #[tokio::test]
    async fn test_upsert_creates_when_not_found() {
        let (server, sf) = setup().await;
        mount_lookup(&server, json!({"totalSize": 0, "records": []})).await;

        Mock::given(method("POST"))
            .and(path("/services/data/v53.0/sobjects/Lead"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "00Q2"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let response = sf
            .upsert_record(&lead(json!({"email": "a@b.com"})), "Lead")
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    #[tokio::test]
    async fn test_upsert_updates_when_found() {
        let (server, sf) = setup().await;
        mount_lookup(&server, json!({"totalSize": 1, "records": [{"Id": "00Q3"}]})).await;

        Mock::given(method("PATCH"))
            .and(path("/services/data/v53.0/sobjects/Lead/00Q3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        sf.upsert_record(&lead(json!({"email": "a@b.com"})), "Lead")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upsert_propagates_bad_response() {
        let (server, sf) = setup().await;
        mount_lookup(&server, json!({"records": []})).await;

        let err = sf
            .upsert_record(&lead(json!({"email": "a@b.com"})), "Lead")
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadResponse));
    }

    #[tokio::test]
    async fn test_delete_resolves_then_deletes() {
        let (server, sf) = setup().await;
        mount_lookup(&server, json!({"totalSize": 1, "records": [{"Id": "00Q4"}]})).await;

        Mock::given(method("DELETE"))
            .and(path("/services/data/v53.0/sobjects/Lead/00Q4"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut payload = lead(json!({"email": "a@b.com"}));
        payload.operation = Some("delete".to_string());
        sf.perform(&payload, "Lead").await.unwrap();
    }

    #[tokio::test]
    async fn test_operations_require_traits() {
        let (server, sf) = setup().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for (payload, op) in [
            (GenericPayload::default(), "update"),
            (lead(json!({})), "upsert"),
            (lead(json!({})), "delete"),
        ] {
            let mut payload = payload;
            payload.operation = Some(op.to_string());
            let err = sf.perform(&payload, "Lead").await.unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Undefined Traits when using {op} operation")
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_operator_is_rejected() {
        let (_server, sf) = setup().await;
        let mut payload = lead(json!({"email": "a@b.com"}));
        payload.record_matcher_operator = Some("XOR".into());

        let err = sf.update_record(&payload, "Lead").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidOperator(_)));
    }

    #[test]
    fn test_explicit_id_must_be_truthy() {
        let traits = |v: Value| v.as_object().cloned().unwrap();
        assert_eq!(explicit_id(&traits(json!({"Id": "001"}))), Some("001".into()));
        assert_eq!(explicit_id(&traits(json!({"Id": ""}))), None);
        assert_eq!(explicit_id(&traits(json!({"Id": 0}))), None);
        assert_eq!(explicit_id(&traits(json!({"email": "x"}))), None);
    }
}
