//! Credentials trait and implementations.
//!
//! All credential types implement custom Debug to redact sensitive data.

use crate::error::{Error, ErrorKind, Result};
use crate::{CLIENT_ID_ENV, CLIENT_SECRET_ENV};

/// Trait for an authenticated Salesforce session.
pub trait Credentials: Send + Sync {
    /// Get the Salesforce instance URL.
    fn instance_url(&self) -> &str;

    /// Get the access token.
    fn access_token(&self) -> &str;

    /// Returns true if the credentials appear to be valid (non-empty).
    fn is_valid(&self) -> bool {
        !self.instance_url().is_empty() && !self.access_token().is_empty()
    }
}

/// An instance URL plus the access token that authorizes calls against it.
#[derive(Clone)]
pub struct SalesforceCredentials {
    instance_url: String,
    access_token: String,
    refresh_token: Option<String>,
}

impl std::fmt::Debug for SalesforceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceCredentials")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl SalesforceCredentials {
    /// Create new credentials with the given values.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    /// Attach a refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Get the refresh token if available.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Set a new access token (e.g., after refresh).
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    /// Load credentials from environment variables.
    ///
    /// Required: `SALESFORCE_INSTANCE_URL`, `SALESFORCE_ACCESS_TOKEN`.
    /// Optional: `SALESFORCE_REFRESH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let instance_url = std::env::var("SALESFORCE_INSTANCE_URL")
            .map_err(|_| Error::new(ErrorKind::EnvVar("SALESFORCE_INSTANCE_URL".to_string())))?;
        let access_token = std::env::var("SALESFORCE_ACCESS_TOKEN")
            .map_err(|_| Error::new(ErrorKind::EnvVar("SALESFORCE_ACCESS_TOKEN".to_string())))?;

        let mut creds = Self::new(instance_url, access_token);
        if let Ok(rt) = std::env::var("SALESFORCE_REFRESH_TOKEN") {
            creds = creds.with_refresh_token(rt);
        }
        Ok(creds)
    }
}

impl Credentials for SalesforceCredentials {
    fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Username/password login for the OAuth username-password flow.
#[derive(Clone)]
pub struct PasswordCredentials {
    pub username: String,
    password: String,
    security_token: Option<String>,
    pub is_sandbox: bool,
}

impl std::fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field(
                "security_token",
                &self.security_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("is_sandbox", &self.is_sandbox)
            .finish()
    }
}

impl PasswordCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            security_token: None,
            is_sandbox: false,
        }
    }

    /// Security token appended to the password when the org requires one.
    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.security_token = (!token.is_empty()).then_some(token);
        self
    }

    /// Log in against the sandbox host.
    pub fn sandbox(mut self, is_sandbox: bool) -> Self {
        self.is_sandbox = is_sandbox;
        self
    }

    /// The password Salesforce expects: the account password followed by the
    /// security token, if any.
    pub fn combined_password(&self) -> String {
        match &self.security_token {
            Some(token) => format!("{}{}", self.password, token),
            None => self.password.clone(),
        }
    }

    /// Login host for these credentials.
    pub fn login_url(&self) -> &'static str {
        crate::login_url(self.is_sandbox)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(Error::new(ErrorKind::InvalidCredentials(
                "username and password are required".to_string(),
            )));
        }
        Ok(())
    }
}

/// Consumer key and secret of the connected app used for token grants.
#[derive(Clone)]
pub struct ConnectedApp {
    pub client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for ConnectedApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectedApp")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl ConnectedApp {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read `SALESFORCE_CLIENT_ID` and `SALESFORCE_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            std::env::var(CLIENT_ID_ENV).ok(),
            std::env::var(CLIENT_SECRET_ENV).ok(),
        )
    }

    /// Build from optional values; missing or empty values are an error.
    pub fn from_values(client_id: Option<String>, client_secret: Option<String>) -> Result<Self> {
        match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Ok(Self::new(id, secret))
            }
            _ => Err(Error::new(ErrorKind::MissingCredentials(
                "Missing Salesforce client ID or client secret".to_string(),
            ))),
        }
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }
}
