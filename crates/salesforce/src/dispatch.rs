//! Routing of batches to bulk ingest jobs.

use actions_client::{RequestClient, Response};
use tracing::instrument;

use crate::bulk::BulkOperation;
use crate::client::Salesforce;
use crate::error::{Error, ErrorKind, Result};
use crate::observer::BulkLogging;
use crate::payload::{GenericPayload, RecordOperation, SyncMode};

impl TryFrom<RecordOperation> for BulkOperation {
    type Error = Error;

    fn try_from(operation: RecordOperation) -> Result<Self> {
        match operation {
            RecordOperation::Create => Ok(BulkOperation::Insert),
            RecordOperation::Update => Ok(BulkOperation::Update),
            RecordOperation::Upsert => Ok(BulkOperation::Upsert),
            RecordOperation::Delete => Err(Error::new(ErrorKind::UnsupportedOperation)),
        }
    }
}

impl TryFrom<SyncMode> for BulkOperation {
    type Error = Error;

    fn try_from(mode: SyncMode) -> Result<Self> {
        match mode {
            SyncMode::Add => Ok(BulkOperation::Insert),
            SyncMode::Update => Ok(BulkOperation::Update),
            SyncMode::Upsert => Ok(BulkOperation::Upsert),
            SyncMode::Delete => Err(Error::new(ErrorKind::UnsupportedOperation)),
        }
    }
}

/// Every payload must have opted into batching. Checked before any request.
fn ensure_batching(payloads: &[GenericPayload]) -> Result<&GenericPayload> {
    let first = payloads
        .first()
        .ok_or_else(|| Error::new(ErrorKind::EmptyBatch))?;
    if payloads.iter().all(|p| p.enable_batching) {
        Ok(first)
    } else {
        Err(Error::new(ErrorKind::BulkMismatch))
    }
}

impl<C: RequestClient> Salesforce<C> {
    /// Route a batch by the first payload's `operation` field.
    ///
    /// `create` runs a bulk insert; `delete` is not supported by Bulk API here.
    #[instrument(skip(self, payloads, logging), fields(batch_size = payloads.len()))]
    pub async fn bulk_handler(
        &self,
        payloads: &[GenericPayload],
        sobject: &str,
        logging: Option<&BulkLogging>,
    ) -> Result<Response> {
        let first = ensure_batching(payloads)?;
        let operation = BulkOperation::try_from(first.record_operation()?)?;
        self.run_bulk(payloads, sobject, operation, logging).await
    }

    /// Route a batch by the action's sync mode (`add`, `update`, `upsert`, `delete`).
    #[instrument(skip(self, payloads, logging), fields(batch_size = payloads.len()))]
    pub async fn bulk_handler_with_sync_mode(
        &self,
        payloads: &[GenericPayload],
        sobject: &str,
        sync_mode: Option<&str>,
        logging: Option<&BulkLogging>,
    ) -> Result<Response> {
        ensure_batching(payloads)?;
        let mode: SyncMode = sync_mode
            .ok_or_else(|| Error::new(ErrorKind::UndefinedSyncMode))?
            .parse()?;
        let operation = BulkOperation::try_from(mode)?;
        self.run_bulk(payloads, sobject, operation, logging).await
    }

    async fn run_bulk(
        &self,
        payloads: &[GenericPayload],
        sobject: &str,
        operation: BulkOperation,
        logging: Option<&BulkLogging>,
    ) -> Result<Response> {
        match operation {
            BulkOperation::Insert => self.bulk_insert(payloads, sobject, logging).await,
            BulkOperation::Update => self.bulk_update(payloads, sobject, logging).await,
            BulkOperation::Upsert => self.bulk_upsert(payloads, sobject, logging).await,
        }
    }

    async fn bulk_insert(
        &self,
        payloads: &[GenericPayload],
        sobject: &str,
        logging: Option<&BulkLogging>,
    ) -> Result<Response> {
        self.handle_bulk_job(payloads, sobject, "", BulkOperation::Insert, logging)
            .await
    }

    async fn bulk_upsert(
        &self,
        payloads: &[GenericPayload],
        sobject: &str,
        logging: Option<&BulkLogging>,
    ) -> Result<Response> {
        let external_id_name = payloads[0]
            .bulk_upsert_external_id
            .as_ref()
            .and_then(|ext| ext.complete_name())
            .ok_or_else(|| Error::new(ErrorKind::UndefinedBulkUpsertExternalId))?;

        self.handle_bulk_job(
            payloads,
            sobject,
            external_id_name,
            BulkOperation::Upsert,
            logging,
        )
        .await
    }

    async fn bulk_update(
        &self,
        payloads: &[GenericPayload],
        sobject: &str,
        logging: Option<&BulkLogging>,
    ) -> Result<Response> {
        if payloads[0]
            .bulk_update_record_id
            .as_deref()
            .is_none_or(str::is_empty)
        {
            return Err(Error::new(ErrorKind::UndefinedBulkUpdateRecordId));
        }

        self.handle_bulk_job(payloads, sobject, "Id", BulkOperation::Update, logging)
            .await
    }
}
