use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, ErrorKind, Result};

/// Default Drip REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.getdrip.com/v2";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Drip destination settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DripSettings {
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub account_id: String,
}

impl fmt::Debug for DripSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DripSettings")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("account_id", &self.account_id)
            .finish()
    }
}

impl DripSettings {
    /// Settings against the default endpoint.
    pub fn new(api_key: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: default_endpoint(),
            account_id: account_id.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::new(ErrorKind::InvalidSettings(
                "API key is required".to_string(),
            )));
        }
        if self.account_id.is_empty() {
            return Err(Error::new(ErrorKind::InvalidSettings(
                "account id is required".to_string(),
            )));
        }
        if self.endpoint.trim().is_empty() {
            return Err(Error::new(ErrorKind::InvalidSettings(
                "endpoint is required".to_string(),
            )));
        }
        Ok(())
    }

    /// `Basic` credentials: the API key as user name, no password.
    pub(crate) fn authorization(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:", self.api_key)))
    }

    /// `{endpoint}/{account_id}/{path}`
    pub(crate) fn account_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim().trim_end_matches('/'),
            self.account_id,
            path
        )
    }
}
