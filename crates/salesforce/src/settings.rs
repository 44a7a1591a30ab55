//! Destination settings and authenticated request clients.

use actions_client::SfHttpClient;
use actions_sf_auth::{ConnectedApp, OAuthClient, PasswordCredentials};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

use crate::client::Salesforce;
use crate::error::{Error, ErrorKind, Result};

pub const INSTANCE_URL_ENV: &str = "SALESFORCE_INSTANCE_URL";
pub const USERNAME_ENV: &str = "SALESFORCE_USERNAME";
pub const PASSWORD_ENV: &str = "SALESFORCE_PASSWORD";
pub const SECURITY_TOKEN_ENV: &str = "SALESFORCE_SECURITY_TOKEN";
pub const SANDBOX_ENV: &str = "SALESFORCE_IS_SANDBOX";

/// Salesforce destination settings.
///
/// When `username` and `auth_password` are both set, requests authenticate
/// with the username-password grant instead of the host's OAuth token.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "instanceUrl")]
    pub instance_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_token: Option<String>,
    #[serde(rename = "isSandbox", default)]
    pub is_sandbox: bool,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("instance_url", &self.instance_url)
            .field("username", &self.username)
            .field("auth_password", &self.auth_password.as_ref().map(|_| "[REDACTED]"))
            .field("security_token", &self.security_token.as_ref().map(|_| "[REDACTED]"))
            .field("is_sandbox", &self.is_sandbox)
            .finish()
    }
}

impl Settings {
    pub fn new(instance_url: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            ..Default::default()
        }
    }

    /// Authenticate with a username and password (plus optional security token).
    pub fn with_password(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        security_token: Option<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.auth_password = Some(password.into());
        self.security_token = security_token;
        self
    }

    pub fn sandbox(mut self, is_sandbox: bool) -> Self {
        self.is_sandbox = is_sandbox;
        self
    }

    /// Read settings from `SALESFORCE_*` environment variables.
    ///
    /// Only `SALESFORCE_INSTANCE_URL` is required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let instance_url = non_empty(INSTANCE_URL_ENV).ok_or_else(|| {
            Error::new(ErrorKind::MissingCredentials(format!(
                "Missing {}",
                INSTANCE_URL_ENV
            )))
        })?;

        Ok(Self {
            instance_url,
            username: non_empty(USERNAME_ENV),
            auth_password: non_empty(PASSWORD_ENV),
            security_token: non_empty(SECURITY_TOKEN_ENV),
            is_sandbox: non_empty(SANDBOX_ENV)
                .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1"),
        })
    }

    /// Password credentials, when both username and password are configured.
    pub fn password_credentials(&self) -> Option<PasswordCredentials> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        let password = self.auth_password.as_deref().filter(|p| !p.is_empty())?;

        let mut credentials = PasswordCredentials::new(username, password).sandbox(self.is_sandbox);
        if let Some(token) = &self.security_token {
            credentials = credentials.with_security_token(token.as_str());
        }
        Some(credentials)
    }
}

/// Return a request client for `settings`.
///
/// Without password credentials this is `base` unchanged. Otherwise the user
/// is authenticated against the login host with the connected app from
/// `SALESFORCE_CLIENT_ID` / `SALESFORCE_CLIENT_SECRET`, and a fresh client
/// bearing the new access token is returned.
pub async fn generate_salesforce_request(
    settings: &Settings,
    base: SfHttpClient,
) -> Result<SfHttpClient> {
    if settings.password_credentials().is_none() {
        return Ok(base);
    }
    let oauth = OAuthClient::new(ConnectedApp::from_env()?);
    generate_salesforce_request_with(settings, base, &oauth).await
}

/// Like [`generate_salesforce_request`], with an explicit OAuth client.
#[instrument(skip(settings, base, oauth), fields(is_sandbox = settings.is_sandbox))]
pub async fn generate_salesforce_request_with(
    settings: &Settings,
    base: SfHttpClient,
    oauth: &OAuthClient,
) -> Result<SfHttpClient> {
    let Some(credentials) = settings.password_credentials() else {
        return Ok(base);
    };

    let token = oauth.authenticate_with_password(&credentials).await?;
    debug!("Authenticated with username-password grant");

    let client = SfHttpClient::new(base.config().clone())?.with_bearer_auth(token.access_token);
    Ok(client)
}

impl Salesforce<SfHttpClient> {
    /// Build a client for `settings`, authenticating first when password
    /// credentials are configured.
    pub async fn from_settings(settings: &Settings, base: SfHttpClient) -> Result<Self> {
        let request = generate_salesforce_request(settings, base).await?;
        Salesforce::new(&settings.instance_url, request)
    }
}
