//! Error types for actions-client.

use std::time::Duration;

/// Result type alias for actions-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for actions-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns true if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.kind, ErrorKind::RateLimited { .. })
    }

    /// Returns the retry-after duration if this is a rate limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match &self.kind {
            ErrorKind::RateLimited { retry_after } => *retry_after,
            ErrorKind::RetriesExhausted { last, .. } => last.retry_after(),
            _ => None,
        }
    }

    /// True when the server cannot have acted on the request: the connection
    /// was never made, or it answered 429 or 503.
    pub fn is_unprocessed(&self) -> bool {
        match &self.kind {
            ErrorKind::Connection(_) | ErrorKind::RateLimited { .. } => true,
            kind => kind.status() == Some(503),
        }
    }

    /// HTTP status carried by the error, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        self.kind.status()
    }

    /// Salesforce `message` of the first error entry, if the response had one.
    pub fn api_message(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::SalesforceApi { message, .. } => Some(message),
            ErrorKind::RetriesExhausted { last, .. } => last.api_message(),
            _ => None,
        }
    }

    /// Salesforce `errorCode` of the first error entry, if the response had one.
    pub fn api_error_code(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::SalesforceApi { error_code, .. } => Some(error_code),
            ErrorKind::RetriesExhausted { last, .. } => last.api_error_code(),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// HTTP request failed.
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limited{}", retry_after.map(|d| format!(", retry after {:?}", d)).unwrap_or_default())]
    RateLimited { retry_after: Option<Duration> },

    /// Authentication error (HTTP 401).
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Authorization error (HTTP 403).
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error body returned by a Salesforce API (`[{"message", "errorCode"}]`).
    #[error("Salesforce API error: {error_code} - {message}")]
    SalesforceApi {
        status: u16,
        error_code: String,
        message: String,
        fields: Vec<String>,
    },

    /// All retries exhausted. `last` is the error of the final attempt.
    #[error("All {attempts} retry attempts exhausted: {last}")]
    RetriesExhausted { attempts: u32, last: Box<Error> },

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ErrorKind {
    /// Returns true if this error kind is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::RateLimited { .. } => true,
            ErrorKind::Timeout => true,
            ErrorKind::Connection(_) => true,
            ErrorKind::Http { status, .. } | ErrorKind::SalesforceApi { status, .. } => {
                is_retryable_status(*status)
            }
            _ => false,
        }
    }

    /// HTTP status associated with this kind.
    pub fn status(&self) -> Option<u16> {
        match self {
            ErrorKind::Http { status, .. } | ErrorKind::SalesforceApi { status, .. } => {
                Some(*status)
            }
            ErrorKind::RateLimited { .. } => Some(429),
            ErrorKind::Authentication(_) => Some(401),
            ErrorKind::Authorization(_) => Some(403),
            ErrorKind::NotFound(_) => Some(404),
            ErrorKind::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

/// Check if an HTTP status code is typically retryable.
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ErrorKind::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Config(format!("Invalid URL: {}", err)), err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Other(format!("Form encoding failed: {}", err)), err)
    }
}
