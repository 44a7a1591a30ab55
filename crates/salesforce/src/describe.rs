//! Dynamic field choices built from the org's global describe.

use actions_client::{RequestBuilder, RequestClient, RequestMethod};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::client::Salesforce;
use crate::error::Result;

const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, Deserialize)]
struct DescribeGlobalResult {
    #[serde(default)]
    sobjects: Vec<SObjectBasicInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct SObjectBasicInfo {
    name: String,
    label: String,
    #[serde(default)]
    createable: bool,
}

/// One selectable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Error details attached to a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicFieldError {
    pub message: String,
    pub code: String,
}

/// Choices for a dynamic dropdown, paged by `next_page`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldResponse {
    pub choices: Vec<Choice>,
    pub next_page: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DynamicFieldError>,
}

impl<C: RequestClient> Salesforce<C> {
    /// List the createable sObjects as `{value: name, label}` choices.
    ///
    /// Never fails: errors come back as empty choices with `error` set.
    #[instrument(skip(self))]
    pub async fn custom_object_name(&self) -> DynamicFieldResponse {
        match self.createable_sobjects().await {
            Ok(choices) => DynamicFieldResponse {
                choices,
                next_page: "2".to_string(),
                error: None,
            },
            Err(err) => {
                warn!(error = %err, "Failed to list sObjects");
                DynamicFieldResponse {
                    choices: Vec::new(),
                    next_page: String::new(),
                    error: Some(DynamicFieldError {
                        message: err.api_message().unwrap_or(UNKNOWN_ERROR).to_string(),
                        code: err.api_error_code().unwrap_or(UNKNOWN_ERROR).to_string(),
                    }),
                }
            }
        }
    }

    async fn createable_sobjects(&self) -> Result<Vec<Choice>> {
        let request = RequestBuilder::new(RequestMethod::Get, self.sobjects_url());
        let result: DescribeGlobalResult = self.request.execute(request).await?.json()?;

        Ok(result
            .sobjects
            .into_iter()
            .filter(|sobject| sobject.createable)
            .map(|sobject| Choice {
                value: sobject.name,
                label: sobject.label,
            })
            .collect())
    }
}
