//! Buffered HTTP responses and Salesforce error parsing.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

/// A fully read HTTP response.
///
/// The body is buffered as soon as the response arrives, so a `Response` can
/// be inspected several times and built by hand in tests or by alternative
/// [`RequestClient`](crate::RequestClient) implementations.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Create a response from its parts. Header names are matched case-insensitively.
    pub fn new(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();

        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Shorthand for a JSON response with the given status.
    pub fn from_json(status: u16, value: &serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self::new(status, headers, value.to_string())
    }

    /// Shorthand for an empty response (e.g. `204 No Content`).
    pub fn empty(status: u16) -> Self {
        Self::new(status, HashMap::new(), Bytes::new())
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// Get the Retry-After header as a Duration.
    ///
    /// Only the delay-seconds form is understood.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after")?
            .trim()
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Raw body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| {
            Error::with_source(
                ErrorKind::Other("Failed to decode response as UTF-8".to_string()),
                e,
            )
        })
    }

    /// Deserialize the body as JSON.
    ///
    /// An empty body deserializes as JSON `null`, so `Option<T>` and
    /// `serde_json::Value` targets accept `204 No Content`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_value(serde_json::Value::Null).map_err(Into::into);
        }
        serde_json::from_slice(&self.body).map_err(Into::into)
    }

    /// Get API usage limits from the `Sforce-Limit-Info` header
    /// (`api-usage=25/15000`).
    pub fn api_usage(&self) -> Option<ApiUsage> {
        let info = self.header("sforce-limit-info")?;

        info.split(',')
            .map(str::trim)
            .find_map(|part| part.strip_prefix("api-usage="))
            .and_then(|usage| {
                let (used, limit) = usage.split_once('/')?;
                Some(ApiUsage {
                    used: used.parse().ok()?,
                    limit: limit.parse().ok()?,
                })
            })
    }

    /// Turn a non-2xx response into an error; pass successful ones through.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        if self.status == 429 {
            return Err(Error::new(ErrorKind::RateLimited {
                retry_after: self.retry_after(),
            }));
        }
        let body = String::from_utf8_lossy(&self.body).into_owned();
        Err(parse_error_response(self.status, &body))
    }
}

/// API usage information from response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiUsage {
    /// Number of API calls used.
    pub used: u64,
    /// Total API call limit.
    pub limit: u64,
}

impl ApiUsage {
    /// Get the remaining API calls.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}

/// Parse an error body and convert it to the matching error kind.
fn parse_error_response(status: u16, body: &str) -> Error {
    if status == 429 {
        return Error::new(ErrorKind::RateLimited { retry_after: None });
    }

    // Salesforce REST errors come back as an array; a few endpoints send one object.
    let first = serde_json::from_str::<Vec<SalesforceErrorResponse>>(body)
        .ok()
        .and_then(|errors| errors.into_iter().next())
        .or_else(|| serde_json::from_str::<SalesforceErrorResponse>(body).ok());

    if let Some(err) = first {
        return Error::new(ErrorKind::SalesforceApi {
            status,
            error_code: err.error_code,
            message: sanitize_error_message(&err.message),
            fields: err.fields.unwrap_or_default(),
        });
    }

    let sanitized = sanitize_error_message(body);
    let kind = match status {
        401 => ErrorKind::Authentication(sanitized),
        403 => ErrorKind::Authorization(sanitized),
        404 => ErrorKind::NotFound(sanitized),
        _ => ErrorKind::Http {
            status,
            message: sanitized,
        },
    };

    Error::new(kind)
}

fn token_pattern() -> &'static regex_lite::Regex {
    static PATTERN: OnceLock<regex_lite::Regex> = OnceLock::new();
    // Salesforce access tokens: org id prefix, "!", then the opaque part.
    PATTERN.get_or_init(|| {
        regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+")
            .expect("token pattern is a valid regex")
    })
}

fn session_pattern() -> &'static regex_lite::Regex {
    static PATTERN: OnceLock<regex_lite::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}").expect("session pattern is a valid regex")
    })
}

/// Redact tokens and session ids from an error message and cap its length.
fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let redacted = token_pattern().replace_all(message, "[REDACTED_TOKEN]");
    let mut sanitized = session_pattern()
        .replace_all(&redacted, "sid=[REDACTED]")
        .into_owned();

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}

/// Salesforce API error response format.
#[derive(Debug, serde::Deserialize)]
struct SalesforceErrorResponse {
    #[serde(alias = "errorCode")]
    error_code: String,
    message: String,
    fields: Option<Vec<String>>,
}
