use std::sync::{Arc, Mutex, Once};

use destination_actions::client::{ClientConfig, RetryConfig, SfHttpClient};
use destination_actions::salesforce::{BulkLogging, BulkObserver, GenericPayload, Salesforce};
use serde_json::{json, Value};
use wiremock::MockServer;

static TRACING: Once = Once::new();

/// Install a test subscriber once; `RUST_LOG` controls the output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// HTTP client that sends each request once.
pub fn no_retry_client() -> SfHttpClient {
    SfHttpClient::new(ClientConfig::builder().without_retry().build())
        .expect("client should build")
}

/// HTTP client with fast retries.
pub fn fast_retry_client(max_retries: u32) -> SfHttpClient {
    let retry = RetryConfig {
        max_attempts: max_retries,
        initial_delay: std::time::Duration::from_millis(5),
        max_delay: std::time::Duration::from_millis(20),
        ..Default::default()
    };
    SfHttpClient::new(ClientConfig::builder().with_retry(retry).build())
        .expect("client should build")
}

pub fn salesforce(server: &MockServer, request: SfHttpClient) -> Salesforce {
    init_tracing();
    Salesforce::new(&server.uri(), request).expect("mock server URI is valid")
}

/// Batch payload for `sobject` built from JSON, with batching enabled.
pub fn batch_payload(mut value: Value) -> GenericPayload {
    value["enable_batching"] = json!(true);
    serde_json::from_value(value).expect("payload JSON should deserialize")
}

/// Observer that keeps everything it is told.
#[derive(Default)]
pub struct CapturingObserver {
    pub counters: Mutex<Vec<(String, u64, Vec<String>)>>,
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl CapturingObserver {
    pub fn metrics(&self) -> Vec<String> {
        self.counters
            .lock()
            .unwrap()
            .iter()
            .map(|(metric, _, _)| metric.clone())
            .collect()
    }

    pub fn logging(self: &Arc<Self>, should_log: bool) -> BulkLogging {
        BulkLogging::new(should_log)
            .with_observer(self.clone())
            .with_tags(["destination:salesforce"])
    }
}

impl BulkObserver for CapturingObserver {
    fn incr(&self, metric: &str, value: u64, tags: &[String]) {
        self.counters
            .lock()
            .unwrap()
            .push((metric.to_string(), value, tags.to_vec()));
    }

    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}
