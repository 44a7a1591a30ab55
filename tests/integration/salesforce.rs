//! Salesforce destination pipelines against a mock org.

use std::sync::Arc;

use destination_actions::auth::{ConnectedApp, OAuthClient};
use destination_actions::salesforce::{
    generate_salesforce_request_with, ErrorKind, GenericPayload, Settings,
};
use serde_json::json;
use wiremock::matchers::{any, body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{batch_payload, fast_retry_client, no_retry_client, salesforce, CapturingObserver};

const INGEST: &str = "/services/data/v53.0/jobs/ingest";
const JOB: &str = "/services/data/v53.0/jobs/ingest/750R0000000zHpF";
const BATCHES: &str = "/services/data/v53.0/jobs/ingest/750R0000000zHpF/batches";

async fn mount_create_job(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(INGEST))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "750R0000000zHpF",
            "state": "Open",
            "operation": "upsert",
            "object": "Account"
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn upsert_batch() -> Vec<GenericPayload> {
    vec![
        batch_payload(json!({
            "operation": "upsert",
            "name": "Acme",
            "phone": "555-0100",
            "bulkUpsertExternalId": {"externalIdName": "Ext__c", "externalIdValue": "e-1"}
        })),
        batch_payload(json!({
            "operation": "upsert",
            "name": "Globex",
            "bulkUpsertExternalId": {"externalIdName": "Ext__c", "externalIdValue": "e-2"}
        })),
    ]
}

#[tokio::test]
async fn test_bulk_upsert_pipeline_reports_progress() {
    let server = MockServer::start().await;
    let sf = salesforce(&server, no_retry_client());

    mount_create_job(
        &server,
        json!({
            "object": "Account",
            "contentType": "CSV",
            "operation": "upsert",
            "externalIdFieldName": "Ext__c"
        }),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path(BATCHES))
        .and(header("Content-Type", "text/csv"))
        .and(body_string("Name,Phone,Ext__c\nAcme,555-0100,e-1\nGlobex,,e-2\n"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(JOB))
        .and(body_json(json!({"state": "UploadComplete"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "750R0000000zHpF",
            "state": "UploadComplete"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let observer = Arc::new(CapturingObserver::default());
    let logging = observer.logging(true);

    let response = sf
        .bulk_handler_with_sync_mode(&upsert_batch(), "Account", Some("upsert"), Some(&logging))
        .await
        .expect("bulk upsert should succeed");
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["state"], "UploadComplete");

    assert_eq!(
        observer.metrics(),
        vec![
            "bulkJob.createBulkJob",
            "bulkCSV.payloadSize",
            "bulkCSV.numberOfColumns",
            "bulkCSV.numberOfValuesInCSV",
            "bulkCSV.numberOfNullsInCSV",
            "bulkJob.uploadCSV",
            "bulkJob.closeBulkJob",
        ]
    );
    let counters = observer.counters.lock().unwrap();
    let value = |metric: &str| {
        counters
            .iter()
            .find(|(m, _, _)| m == metric)
            .map(|(_, v, _)| *v)
            .unwrap()
    };
    assert_eq!(value("bulkCSV.payloadSize"), 2);
    assert_eq!(value("bulkCSV.numberOfColumns"), 3);
    assert_eq!(value("bulkCSV.numberOfValuesInCSV"), 6);
    assert_eq!(value("bulkCSV.numberOfNullsInCSV"), 1);
    assert!(counters.iter().all(|(_, _, tags)| tags
        == &vec![
            "destination:salesforce".to_string(),
            "jobId:750R0000000zHpF".to_string()
        ]));

    let infos = observer.infos.lock().unwrap();
    assert!(infos[0].starts_with("Created bulk job: 750R0000000zHpF with data: "));
    assert!(infos[1].starts_with("Uploading CSV to job: 750R0000000zHpF\nCSV: Name,Phone,Ext__c"));
    assert_eq!(infos[2], "Closing job: 750R0000000zHpF");
    assert!(observer.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_upload_still_closes_job() {
    let server = MockServer::start().await;
    let sf = salesforce(&server, no_retry_client());

    mount_create_job(
        &server,
        json!({"object": "Lead", "contentType": "CSV", "operation": "insert"}),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path(BATCHES))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([{
            "errorCode": "INVALIDJOBSTATE",
            "message": "Found multiple contents for job"
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(JOB))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "UploadComplete"})))
        .expect(1)
        .mount(&server)
        .await;

    let payloads = vec![batch_payload(json!({
        "operation": "create",
        "last_name": "Smith",
        "company": "Acme"
    }))];

    let observer = Arc::new(CapturingObserver::default());
    let err = sf
        .bulk_handler(&payloads, "Lead", Some(&observer.logging(true)))
        .await
        .unwrap_err();

    assert_eq!(err.api_error_code(), Some("INVALIDJOBSTATE"));
    assert_eq!(err.status(), 400);
    assert!(observer.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_upload_and_close_returns_upload_error() {
    let server = MockServer::start().await;
    let sf = salesforce(&server, no_retry_client());

    mount_create_job(
        &server,
        json!({"object": "Lead", "contentType": "CSV", "operation": "insert"}),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path(BATCHES))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([{
            "errorCode": "INVALIDJOBSTATE",
            "message": "Upload rejected"
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(JOB))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!([{
            "errorCode": "NOT_FOUND",
            "message": "Job gone"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let payloads = vec![batch_payload(json!({"operation": "create", "last_name": "Smith"}))];

    // Progress logging off: the close failure is still reported.
    let observer = Arc::new(CapturingObserver::default());
    let err = sf
        .bulk_handler(&payloads, "Lead", Some(&observer.logging(false)))
        .await
        .unwrap_err();

    assert_eq!(err.api_error_code(), Some("INVALIDJOBSTATE"));
    assert_eq!(observer.metrics(), vec!["bulkJobError.caughUploadError"]);
    assert_eq!(
        observer.errors.lock().unwrap().as_slice(),
        ["Failed to close bulk job: 750R0000000zHpF. Message: Job gone. Code: NOT_FOUND"]
    );
}

#[tokio::test]
async fn test_mixed_batching_is_rejected_before_network() {
    let server = MockServer::start().await;
    let sf = salesforce(&server, no_retry_client());

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut payloads = upsert_batch();
    payloads[1].enable_batching = false;

    let err = sf
        .bulk_handler_with_sync_mode(&payloads, "Account", Some("upsert"), None)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BulkMismatch));
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_single_record_upsert_updates_matched_record() {
    let server = MockServer::start().await;
    let sf = salesforce(&server, no_retry_client());

    Mock::given(method("GET"))
        .and(path("/services/data/v53.0/query/"))
        .and(query_param(
            "q",
            "SELECT Id FROM Contact WHERE Email = 'o\\'brien@example.com' AND LastName = 'OBrien'",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 1,
            "done": true,
            "records": [{"Id": "003A"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/services/data/v53.0/sobjects/Contact/003A"))
        .and(body_json(json!({
            "LastName": "OBrien",
            "MailingCity": "Dublin",
            "Title__c": "CTO"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let payload: GenericPayload = serde_json::from_value(json!({
        "operation": "upsert",
        "recordMatcherOperator": "AND",
        "traits": {"Email": "o'brien@example.com", "LastName": "OBrien"},
        "last_name": "OBrien",
        "city": "Dublin",
        "customFields": {"Title__c": "CTO"}
    }))
    .unwrap();

    let response = sf.perform(&payload, "Contact").await.unwrap();
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_lookup_retries_transient_errors() {
    let server = MockServer::start().await;
    let sf = salesforce(&server, fast_retry_client(2));

    Mock::given(method("GET"))
        .and(path("/services/data/v53.0/query/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v53.0/query/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 1,
            "records": [{"Id": "00QB"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let traits = json!({"Email": "a@b.com"}).as_object().cloned().unwrap();
    let id = sf
        .lookup_traits(&traits, "Lead", Default::default())
        .await
        .unwrap();
    assert_eq!(id, "00QB");
}

#[tokio::test]
async fn test_throttled_lookup_reports_rate_limit() {
    let server = MockServer::start().await;
    let sf = salesforce(&server, fast_retry_client(2));

    Mock::given(method("GET"))
        .and(path("/services/data/v53.0/query/"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let traits = json!({"Email": "a@b.com"}).as_object().cloned().unwrap();
    let err = sf
        .lookup_traits(&traits, "Lead", Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), 429);
}

#[tokio::test]
async fn test_password_settings_authenticate_org_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "00Dxx0000001gPL!AQ4AQFresh",
            "instance_url": server.uri(),
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v53.0/sobjects"))
        .and(header("Authorization", "Bearer 00Dxx0000001gPL!AQ4AQFresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sobjects": [{"name": "Lead", "label": "Lead", "createable": true}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings =
        Settings::new(server.uri()).with_password("ops@acme.com", "pw", Some("tok".into()));
    let oauth = OAuthClient::new(ConnectedApp::new("id", "secret")).with_login_url(server.uri());

    let request = generate_salesforce_request_with(&settings, no_retry_client(), &oauth)
        .await
        .unwrap();
    assert!(request.config().retry.is_none());

    let sf = salesforce(&server, request);
    let choices = sf.custom_object_name().await;
    assert_eq!(choices.next_page, "2");
    assert_eq!(choices.choices.len(), 1);
}
