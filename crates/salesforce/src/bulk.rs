//! Bulk API 2.0 ingest jobs.
//!
//! A job runs create → upload → close, strictly in order. Once a job exists
//! it is always closed: a job left open stays pending on the Salesforce side
//! and holds a quota slot. When the upload fails the close still runs as a
//! compensating step, and the upload error is the one returned.

use actions_client::{RequestBuilder, RequestClient, RequestMethod, Response};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, instrument};

use crate::client::Salesforce;
use crate::csv_data::build_csv_data;
use crate::error::{Error, ErrorKind, Result};
use crate::observer::{BulkLogging, JobRecorder};
use crate::payload::GenericPayload;

/// Bulk ingest operations this destination drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOperation {
    Insert,
    Update,
    Upsert,
}

impl BulkOperation {
    /// Get the API string for this operation.
    pub fn api_name(&self) -> &'static str {
        match self {
            BulkOperation::Insert => "insert",
            BulkOperation::Update => "update",
            BulkOperation::Upsert => "upsert",
        }
    }

    /// Whether the job request names an id field.
    pub fn uses_id_field(&self) -> bool {
        matches!(self, BulkOperation::Update | BulkOperation::Upsert)
    }
}

/// Bulk API 2.0 job states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// Job is open and accepting data
    Open,
    /// Upload is complete, job is ready for processing
    UploadComplete,
    InProgress,
    Aborted,
    JobComplete,
    Failed,
}

/// Content type for Bulk API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContentType {
    #[default]
    #[serde(rename = "CSV")]
    Csv,
}

/// Request body for `POST jobs/ingest`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngestJobRequest {
    pub object: String,
    pub content_type: ContentType,
    pub operation: BulkOperation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id_field_name: Option<String>,
}

impl CreateIngestJobRequest {
    /// The id field is only sent for update and upsert.
    pub fn new(object: impl Into<String>, operation: BulkOperation, id_field: &str) -> Self {
        Self {
            object: object.into(),
            content_type: ContentType::Csv,
            operation,
            external_id_field_name: operation.uses_id_field().then(|| id_field.to_string()),
        }
    }
}

/// Request body for `PATCH jobs/ingest/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateJobStateRequest {
    pub state: JobState,
}

impl UpdateJobStateRequest {
    pub fn upload_complete() -> Self {
        Self {
            state: JobState::UploadComplete,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateJobResponseData {
    id: Option<String>,
    state: Option<JobState>,
}

/// Lifecycle of one ingest job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Building,
    Created,
    Uploading,
    Uploaded,
    UploadFailed,
    Closed,
}

impl JobPhase {
    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_advance_to(self, next: JobPhase) -> bool {
        use JobPhase::*;
        matches!(
            (self, next),
            (Building, Created)
                | (Created, Uploading)
                | (Uploading, Uploaded | UploadFailed)
                | (Uploaded | UploadFailed, Closed)
        )
    }
}

/// A primary step that failed, plus the outcome of its compensating step.
#[derive(Debug)]
pub struct CompensatedFailure<E> {
    /// The failure the caller sees.
    pub primary: E,
    /// Failure of the compensating step, if it failed too.
    pub compensating: Option<E>,
}

/// Run `primary`; if it fails, run `compensate` and report both outcomes on
/// separate channels. The compensating result never replaces the primary
/// error.
pub async fn with_compensation<T, U, E, P, F, Fut>(
    primary: P,
    compensate: F,
) -> std::result::Result<T, CompensatedFailure<E>>
where
    P: Future<Output = std::result::Result<T, E>>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<U, E>>,
{
    match primary.await {
        Ok(value) => Ok(value),
        Err(primary) => Err(CompensatedFailure {
            primary,
            compensating: compensate().await.err(),
        }),
    }
}

fn close_failure_message(job_id: &str, err: &Error) -> String {
    format!(
        "Failed to close bulk job: {}. Message: {}. Code: {}",
        job_id,
        err.api_message().unwrap_or("Failed to parse message"),
        err.api_error_code().unwrap_or("Failed to parse code"),
    )
}

impl<C: RequestClient> Salesforce<C> {
    /// Run one ingest job for `payloads`: build CSV, create, upload, close.
    ///
    /// Returns the close response. CSV errors surface before any request.
    #[instrument(skip(self, payloads, logging), fields(batch_size = payloads.len(), operation = operation.api_name()))]
    pub async fn handle_bulk_job(
        &self,
        payloads: &[GenericPayload],
        sobject: &str,
        id_field: &str,
        operation: BulkOperation,
        logging: Option<&BulkLogging>,
    ) -> Result<Response> {
        let mut phase = JobPhase::Building;
        let mut recorder = JobRecorder::new(logging);

        let payload = build_csv_data(payloads, sobject, id_field, operation)?;
        let job_request = CreateIngestJobRequest::new(sobject, operation, id_field);
        let job_id = self.create_bulk_job(&job_request).await?;
        recorder.set_job(&job_id);
        advance(&mut phase, JobPhase::Created, &job_id);

        recorder.info(|| {
            format!(
                "Created bulk job: {} with data: {}",
                job_id,
                serde_json::to_string(&job_request).unwrap_or_default()
            )
        });
        recorder.incr("bulkJob.createBulkJob", 1);

        recorder.incr("bulkCSV.payloadSize", payloads.len() as u64);
        recorder.incr("bulkCSV.numberOfColumns", payload.stats.number_of_columns);
        recorder.incr("bulkCSV.numberOfValuesInCSV", payload.stats.number_of_values);
        recorder.incr("bulkCSV.numberOfNullsInCSV", payload.stats.number_of_nulls);

        advance(&mut phase, JobPhase::Uploading, &job_id);
        let upload = with_compensation(
            self.upload_bulk_csv(&job_id, &payload.csv, &recorder),
            || self.close_bulk_job(&job_id, &recorder),
        )
        .await;

        if let Err(failure) = upload {
            advance(&mut phase, JobPhase::UploadFailed, &job_id);
            match &failure.compensating {
                Some(close_err) => recorder.failure(
                    "bulkJobError.caughUploadError",
                    &close_failure_message(&job_id, close_err),
                ),
                None => advance(&mut phase, JobPhase::Closed, &job_id),
            }
            return Err(failure.primary);
        }

        advance(&mut phase, JobPhase::Uploaded, &job_id);
        match self.close_bulk_job(&job_id, &recorder).await {
            Ok(response) => {
                advance(&mut phase, JobPhase::Closed, &job_id);
                Ok(response)
            }
            Err(err) => {
                recorder.failure("bulkJobError", &close_failure_message(&job_id, &err));
                Err(err)
            }
        }
    }

    async fn create_bulk_job(&self, job_request: &CreateIngestJobRequest) -> Result<String> {
        let request = RequestBuilder::new(RequestMethod::Post, self.ingest_url()).json(job_request)?;
        let response = self.request.execute(request).await?;

        response
            .json::<Option<CreateJobResponseData>>()
            .ok()
            .flatten()
            .and_then(|data| {
                debug!(state = ?data.state, "Ingest job response");
                data.id
            })
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::new(ErrorKind::FailedToCreateBulkJob))
    }

    async fn upload_bulk_csv(
        &self,
        job_id: &str,
        csv: &str,
        recorder: &JobRecorder<'_>,
    ) -> Result<Response> {
        recorder.info(|| format!("Uploading CSV to job: {}\nCSV: {}", job_id, csv));
        recorder.incr("bulkJob.uploadCSV", 1);

        let request = RequestBuilder::new(RequestMethod::Put, self.batches_url(job_id))
            .csv(csv)
            .header("Accept", "application/json");
        Ok(self.request.execute(request).await?)
    }

    async fn close_bulk_job(&self, job_id: &str, recorder: &JobRecorder<'_>) -> Result<Response> {
        recorder.info(|| format!("Closing job: {}", job_id));
        recorder.incr("bulkJob.closeBulkJob", 1);

        let request = RequestBuilder::new(RequestMethod::Patch, self.job_url(job_id))
            .json(&UpdateJobStateRequest::upload_complete())?;
        Ok(self.request.execute(request).await?)
    }
}

fn advance(phase: &mut JobPhase, next: JobPhase, job_id: &str) {
    debug_assert!(
        phase.can_advance_to(next),
        "illegal bulk job transition {:?} -> {:?}",
        phase,
        next
    );
    debug!(job_id, from = ?*phase, to = ?next, "Bulk job transition");
    *phase = next;
}
