//! Salesforce destination client: instance URL handling and endpoint URLs.

use actions_client::{RequestClient, SfHttpClient};

use crate::error::{Error, ErrorKind, Result};

/// REST and Bulk API version used for every call.
pub const API_VERSION: &str = "v53.0";

/// Salesforce operations bound to one org instance.
///
/// All network calls go through the injected [`RequestClient`], which is
/// expected to carry authentication (see
/// [`generate_salesforce_request`](crate::generate_salesforce_request)).
///
/// # Example
///
/// ```rust,ignore
/// use actions_client::SfHttpClient;
/// use actions_salesforce::Salesforce;
///
/// let request = SfHttpClient::default_client()?.with_bearer_auth(token);
/// let sf = Salesforce::new("https://acme.my.salesforce.com", request)?;
/// let id = sf.lookup_traits(&traits, "Lead", SoqlOperator::Or).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Salesforce<C = SfHttpClient> {
    pub(crate) instance_url: String,
    pub(crate) request: C,
}

impl<C: RequestClient> Salesforce<C> {
    /// Bind to an instance. The URL must be absolute http(s); it is stored
    /// with exactly one trailing slash.
    pub fn new(instance_url: &str, request: C) -> Result<Self> {
        Ok(Self {
            instance_url: validate_instance_url(instance_url)?,
            request,
        })
    }

    /// The normalized instance URL (ends with `/`).
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// The underlying request client.
    pub fn request_client(&self) -> &C {
        &self.request
    }

    pub(crate) fn data_url(&self, path: &str) -> String {
        format!(
            "{}services/data/{}/{}",
            self.instance_url, API_VERSION, path
        )
    }

    pub(crate) fn sobjects_url(&self) -> String {
        self.data_url("sobjects")
    }

    pub(crate) fn sobject_url(&self, sobject: &str) -> String {
        self.data_url(&format!("sobjects/{}", sobject))
    }

    pub(crate) fn record_url(&self, sobject: &str, record_id: &str) -> String {
        self.data_url(&format!("sobjects/{}/{}", sobject, record_id))
    }

    pub(crate) fn query_url(&self, soql: &str) -> String {
        self.data_url(&format!("query/?q={}", urlencoding::encode(soql)))
    }

    pub(crate) fn ingest_url(&self) -> String {
        self.data_url("jobs/ingest")
    }

    pub(crate) fn job_url(&self, job_id: &str) -> String {
        self.data_url(&format!("jobs/ingest/{}", job_id))
    }

    pub(crate) fn batches_url(&self, job_id: &str) -> String {
        self.data_url(&format!("jobs/ingest/{}/batches", job_id))
    }
}

/// Check that `instance_url` is an absolute http(s) URL with a host and
/// return it with exactly one trailing slash.
pub fn validate_instance_url(instance_url: &str) -> Result<String> {
    let trimmed = instance_url.trim();
    let parsed = url::Url::parse(trimmed)?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::new(ErrorKind::InvalidInstanceUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        ))));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::new(ErrorKind::InvalidInstanceUrl(
            "missing host".to_string(),
        )));
    }

    Ok(format!("{}/", trimmed.trim_end_matches('/')))
}
