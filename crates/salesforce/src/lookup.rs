//! Trait-based record lookup.

use actions_client::{RequestBuilder, RequestClient, RequestMethod};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::client::Salesforce;
use crate::error::{Error, ErrorKind, Result};
use crate::soql::{build_query, SoqlOperator};

#[derive(Debug, Deserialize)]
struct LookupResponseData {
    #[serde(rename = "totalSize")]
    total_size: Option<u64>,
    #[serde(default)]
    records: Vec<LookupRecord>,
}

#[derive(Debug, Deserialize)]
struct LookupRecord {
    #[serde(rename = "Id")]
    id: Option<String>,
}

impl<C: RequestClient> Salesforce<C> {
    /// Resolve the single record of `sobject` matching `traits`.
    ///
    /// Fails with `RecordNotFound` when nothing matches, with
    /// `MultipleRecordsFound` when more than one record matches and with
    /// `BadResponse` when the response lacks `totalSize` or the record id.
    #[instrument(skip(self, traits), fields(operator = operator.as_str()))]
    pub async fn lookup_traits(
        &self,
        traits: &Map<String, Value>,
        sobject: &str,
        operator: SoqlOperator,
    ) -> Result<String> {
        let soql = build_query(traits, sobject, operator)?;
        let request = RequestBuilder::new(RequestMethod::Get, self.query_url(&soql));
        let response = self.request.execute(request).await?;

        let data = response
            .json::<Value>()
            .ok()
            .and_then(|body| serde_json::from_value::<LookupResponseData>(body).ok())
            .ok_or_else(|| Error::new(ErrorKind::BadResponse))?;

        match data.total_size {
            None => Err(Error::new(ErrorKind::BadResponse)),
            Some(0) => Err(Error::new(ErrorKind::RecordNotFound)),
            Some(1) => {
                let id = data
                    .records
                    .into_iter()
                    .next()
                    .and_then(|record| record.id)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| Error::new(ErrorKind::BadResponse))?;
                debug!(record_id = %id, "Resolved record from traits");
                Ok(id)
            }
            Some(total) => {
                debug!(total, "Traits matched more than one record");
                Err(Error::new(ErrorKind::MultipleRecordsFound))
            }
        }
    }
}
