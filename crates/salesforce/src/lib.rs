//! # actions-salesforce
//!
//! Salesforce destination actions: push analytics-event payloads into
//! Salesforce sObjects one at a time or in Bulk API 2.0 ingest jobs.
//!
//! ## Features
//!
//! - **Record Lookup** - Resolve a record id from trait equality filters (SOQL)
//! - **Single Records** - Create, update, upsert and delete via the REST API
//! - **Bulk Ingest** - Insert, update and upsert batches as CSV ingest jobs,
//!   closing the job even when the upload fails
//! - **Field Mapping** - Standard Lead/Contact/Account/Case/Opportunity fields
//!   plus custom fields
//! - **Describe** - Createable sObjects as dynamic field choices
//! - **Password Auth** - Optional username-password grant per destination
//!
//! ## Example - Upsert a Lead
//!
//! ```rust,ignore
//! use actions_client::SfHttpClient;
//! use actions_salesforce::{GenericPayload, Salesforce, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::new("https://myorg.my.salesforce.com");
//!     let base = SfHttpClient::default_client()?.with_bearer_auth("access_token");
//!     let sf = Salesforce::from_settings(&settings, base).await?;
//!
//!     let payload: GenericPayload = serde_json::from_value(serde_json::json!({
//!         "operation": "upsert",
//!         "traits": {"Email": "jane@example.com"},
//!         "last_name": "Doe",
//!         "company": "Example Inc"
//!     }))?;
//!
//!     sf.perform(&payload, "Lead").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Bulk Upsert with Logging
//!
//! ```rust,ignore
//! use actions_salesforce::BulkLogging;
//!
//! let logging = BulkLogging::new(true).with_tags(["destination:salesforce"]);
//! sf.bulk_handler_with_sync_mode(&payloads, "Account", Some("upsert"), Some(&logging))
//!     .await?;
//! ```

mod bulk;
mod client;
mod csv_data;
mod describe;
mod dispatch;
mod error;
mod lookup;
mod observer;
mod payload;
mod records;
mod settings;
mod shape;
mod soql;

pub use bulk::{
    with_compensation, BulkOperation, CompensatedFailure, ContentType, CreateIngestJobRequest,
    JobPhase, JobState, UpdateJobStateRequest,
};
pub use client::{validate_instance_url, Salesforce, API_VERSION};
pub use csv_data::{build_csv_data, CsvPayload, CsvStats};
pub use describe::{Choice, DynamicFieldError, DynamicFieldResponse};
pub use error::{Error, ErrorKind, Result};
pub use observer::{BulkLogging, BulkObserver, TracingObserver};
pub use payload::{BulkUpsertExternalId, GenericPayload, RecordOperation, SyncMode};
pub use settings::{generate_salesforce_request, generate_salesforce_request_with, Settings};
pub use shape::{build_json_data, map_object_to_shape};
pub use soql::{build_query, escape_quotes, remove_invalid_chars, typecast, SoqlOperator};
