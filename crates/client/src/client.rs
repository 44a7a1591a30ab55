//! Core HTTP client with retry, compression and default auth headers.

use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{RequestBody, RequestBuilder, RequestMethod};
use crate::requester::RequestClient;
use crate::response::Response;
use crate::retry::RetryPolicy;

/// HTTP client with built-in retry, compression and error handling.
///
/// A client can carry a default bearer token and default headers that are
/// applied to every request that does not set its own, which is how a
/// destination's authentication settings reach each call.
#[derive(Clone)]
pub struct SfHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
    default_bearer: Option<String>,
    default_headers: HashMap<String, String>,
}

impl std::fmt::Debug for SfHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SfHttpClient")
            .field("config", &self.config)
            .field(
                "default_bearer",
                &self.default_bearer.as_ref().map(|_| "[REDACTED]"),
            )
            .field("default_headers", &self.default_headers.keys())
            .finish_non_exhaustive()
    }
}

impl SfHttpClient {
    /// Create a new HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            inner,
            config,
            default_bearer: None,
            default_headers: HashMap::new(),
        })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `Authorization: Bearer <token>` on every request without its own token.
    pub fn with_bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.default_bearer = Some(token.into());
        self
    }

    /// Send a header on every request that does not set it itself.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Get, url)
    }

    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, url)
    }

    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Patch, url)
    }

    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Put, url)
    }

    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Delete, url)
    }

    /// Execute a request with automatic retry handling.
    #[instrument(skip(self, request), fields(method = request.method.as_str(), url = %request.url))]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let mut retry_policy = self
            .config
            .retry
            .as_ref()
            .map(|c| RetryPolicy::new(c.clone()));

        loop {
            let err = match self
                .execute_once(&request)
                .await
                .and_then(Response::error_for_status)
            {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && can_resend(&request, &err) => err,
                Err(err) => return Err(err),
            };

            let Some(policy) = retry_policy.as_mut() else {
                return Err(err);
            };

            match policy.next_delay(err.retry_after()) {
                Some(delay) => {
                    warn!(
                        attempt = policy.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None if policy.attempt() == 0 => return Err(err),
                None => {
                    return Err(Error::new(ErrorKind::RetriesExhausted {
                        attempts: policy.attempt(),
                        last: Box::new(err),
                    }))
                }
            }
        }
    }

    /// Execute a single request without retry logic.
    async fn execute_once(&self, request: &RequestBuilder) -> Result<Response> {
        let url = with_query(&request.url, &request.query_params)?;
        let mut req = self.inner.request(request.method.to_reqwest(), url);

        if let Some(token) = request.bearer_token.as_ref().or(self.default_bearer.as_ref()) {
            req = req.bearer_auth(token);
        }

        for (name, value) in &self.default_headers {
            if request.header_value(name).is_none() {
                req = req.header(name.as_str(), value.as_str());
            }
        }
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(ref body) = request.body {
            req = match body {
                RequestBody::Json(value) => req.body(serde_json::to_vec(value)?),
                RequestBody::Text(text) => req.body(text.clone()),
                RequestBody::Bytes(bytes) => req.body(bytes.clone()),
                RequestBody::Form(fields) => req.body(serde_urlencoded::to_string(fields)?),
            };
        }

        if self.config.enable_tracing {
            debug!(method = request.method.as_str(), url = %request.url, "Sending request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();

        if self.config.enable_tracing {
            let content_length = response.content_length();
            if response.status().is_success() {
                debug!(status, content_length, "Response received");
            } else {
                info!(status, content_length, "Non-success response");
            }
        }

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        Ok(Response::new(status, headers, body))
    }
}

impl RequestClient for SfHttpClient {
    fn execute(&self, request: RequestBuilder) -> impl Future<Output = Result<Response>> + Send {
        self.send(request)
    }
}

/// Whether a failed attempt may be sent again.
///
/// POST creates resources, so it is only resent when the server cannot have
/// acted on the first attempt.
fn can_resend(request: &RequestBuilder, err: &Error) -> bool {
    request.method.is_idempotent() || err.is_unprocessed()
}

/// Append query parameters to a URL, percent-encoding them.
fn with_query(url: &str, params: &[(String, String)]) -> Result<String> {
    if params.is_empty() {
        return Ok(url.to_string());
    }
    let mut parsed = url::Url::parse(url)?;
    parsed.query_pairs_mut().extend_pairs(params);
    Ok(parsed.into())
}
