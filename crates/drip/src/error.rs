//! Error types for actions-drip.

/// Result type alias for actions-drip operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for actions-drip operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// HTTP status of the failed Drip call, if there was one.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Client { status, .. } => *status,
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Either userId or anonymousId must be defined")]
    MissingIdentity,

    #[error("Invalid Drip settings: {0}")]
    InvalidSettings(String),

    #[error("{message}")]
    Client {
        status: Option<u16>,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<actions_client::Error> for Error {
    fn from(err: actions_client::Error) -> Self {
        let kind = ErrorKind::Client {
            status: err.status(),
            message: err.to_string(),
        };
        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}
