//! Error types for actions-salesforce.
//!
//! Every error carries an HTTP-equivalent status and a short machine-readable
//! code, so the host can branch on the outcome without matching on messages.

/// Result type alias for actions-salesforce operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for actions-salesforce operations.
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

    /// HTTP-equivalent status of this error.
    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    /// Machine-readable code of this error.
    pub fn code(&self) -> &str {
        self.kind.code()
    }

    /// Salesforce `message` of the failed request, when the error came from one.
    pub fn api_message(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Client {
                api_message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// Salesforce `errorCode` of the failed request, when the error came from one.
    pub fn api_error_code(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Client {
                api_error_code: Some(code),
                ..
            } => Some(code),
            _ => None,
        }
    }

    /// Returns true for a trait lookup that matched no record.
    pub fn is_record_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::RecordNotFound)
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Invalid SOQL operator - {0}")]
    InvalidOperator(String),

    /// A trait value that cannot be written as a SOQL literal.
    #[error("Unsupported datatype for record matcher traits - {0}")]
    UnsupportedDatatype(&'static str),

    /// Traits missing or empty for an operation that needs them.
    #[error("Undefined Traits when using {0} operation")]
    UndefinedTraits(&'static str),

    #[error("No record found with given traits")]
    RecordNotFound,

    #[error("Multiple records returned with given traits")]
    MultipleRecordsFound,

    /// The lookup response lacked `totalSize` or `records[0].Id`.
    #[error("Response missing expected fields")]
    BadResponse,

    #[error("Unsupported operation: Bulk API does not support the delete operation")]
    UnsupportedOperation,

    /// The bulk path was invoked for a batch not configured for batching.
    #[error("Bulk operation triggered where enable_batching is false.")]
    BulkMismatch,

    #[error("syncMode is required")]
    UndefinedSyncMode,

    #[error("Undefined bulkUpsertExternalId.externalIdName or externalIdValue when using bulkUpsert operation")]
    UndefinedBulkUpsertExternalId,

    #[error("Undefined bulkUpdateRecordId when using bulkUpdate operation")]
    UndefinedBulkUpdateRecordId,

    #[error("Failed to create bulk job")]
    FailedToCreateBulkJob,

    #[error("{0}")]
    MissingCredentials(String),

    /// An operation or sync mode name this destination does not know.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Bulk operation triggered with an empty batch")]
    EmptyBatch,

    #[error("Invalid instance URL: {0}")]
    InvalidInstanceUrl(String),

    #[error("CSV error: {0}")]
    Csv(String),

    /// A request failed at the HTTP layer or Salesforce rejected it.
    #[error("{message}")]
    Client {
        status: Option<u16>,
        api_error_code: Option<String>,
        api_message: Option<String>,
        message: String,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl ErrorKind {
    /// HTTP-equivalent status.
    pub fn status(&self) -> u16 {
        match self {
            ErrorKind::RecordNotFound => 404,
            ErrorKind::MultipleRecordsFound => 300,
            ErrorKind::FailedToCreateBulkJob => 500,
            ErrorKind::Client { status, .. } => status.unwrap_or(500),
            ErrorKind::Auth(_) => 401,
            _ => 400,
        }
    }

    /// Short machine-readable code.
    pub fn code(&self) -> &str {
        match self {
            ErrorKind::InvalidOperator(_) => "Invalid SOQL operator",
            ErrorKind::UnsupportedDatatype(_) => "Unsupported Type",
            ErrorKind::UndefinedTraits(_) => "Undefined Traits",
            ErrorKind::RecordNotFound => "Record Not Found",
            ErrorKind::MultipleRecordsFound => "Multiple Records Found",
            ErrorKind::BadResponse => "Bad Response",
            ErrorKind::UnsupportedOperation => "Unsupported operation",
            ErrorKind::BulkMismatch => "Bulk Mismatch",
            ErrorKind::UndefinedSyncMode => "Undefined syncMode",
            ErrorKind::UndefinedBulkUpsertExternalId => {
                "Undefined bulkUpsertExternalId.externalIdName externalIdValue"
            }
            ErrorKind::UndefinedBulkUpdateRecordId => "Undefined bulkUpdateRecordId",
            ErrorKind::FailedToCreateBulkJob => "Failed to create bulk job",
            ErrorKind::MissingCredentials(_) => "Missing Credentials",
            ErrorKind::UnknownOperation(_) => "Unknown operation",
            ErrorKind::EmptyBatch => "Empty batch",
            ErrorKind::InvalidInstanceUrl(_) => "Invalid instance URL",
            ErrorKind::Csv(_) => "CSV Error",
            ErrorKind::Client { api_error_code, .. } => {
                api_error_code.as_deref().unwrap_or("Request Failed")
            }
            ErrorKind::Auth(_) => "Authentication Failed",
        }
    }
}

impl From<actions_client::Error> for Error {
    fn from(err: actions_client::Error) -> Self {
        let kind = ErrorKind::Client {
            status: err.status(),
            api_error_code: err.api_error_code().map(str::to_string),
            api_message: err.api_message().map(str::to_string),
            message: err
                .api_message()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string()),
        };
        Error::with_source(kind, err)
    }
}

impl From<actions_sf_auth::Error> for Error {
    fn from(err: actions_sf_auth::Error) -> Self {
        let kind = if err.is_missing_credentials() {
            ErrorKind::MissingCredentials(err.to_string())
        } else {
            ErrorKind::Auth(err.to_string())
        };
        Error::with_source(kind, err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::with_source(ErrorKind::Csv(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidInstanceUrl(err.to_string()), err)
    }
}
