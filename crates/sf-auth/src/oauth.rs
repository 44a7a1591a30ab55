//! OAuth 2.0 token grants.
//!
//! - **Username-Password Flow** - exchanges a username, password and security
//!   token for an access token
//! - **Refresh Token** - exchanges a refresh token for a new access token

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::credentials::{ConnectedApp, PasswordCredentials, SalesforceCredentials};
use crate::error::{Error, ErrorKind, Result};

/// OAuth client for authenticating with Salesforce.
#[derive(Clone)]
pub struct OAuthClient {
    app: ConnectedApp,
    http_client: reqwest::Client,
    login_url: Option<String>,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("app", &self.app)
            .field("login_url", &self.login_url)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Create a new OAuth client for a connected app.
    pub fn new(app: ConnectedApp) -> Self {
        Self {
            app,
            http_client: reqwest::Client::new(),
            login_url: None,
        }
    }

    /// Send token requests to `login_url` instead of the production or
    /// sandbox host.
    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = Some(login_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Get the connected app.
    pub fn app(&self) -> &ConnectedApp {
        &self.app
    }

    fn token_url(&self, is_sandbox: bool) -> String {
        let base = self
            .login_url
            .as_deref()
            .unwrap_or_else(|| crate::login_url(is_sandbox));
        format!("{}/services/oauth2/token", base)
    }

    /// Obtain an access token with the username-password flow.
    ///
    /// The password sent is the account password followed by the security
    /// token. Credentials are not logged.
    #[instrument(skip(self, credentials), fields(sandbox = credentials.is_sandbox))]
    pub async fn authenticate_with_password(
        &self,
        credentials: &PasswordCredentials,
    ) -> Result<TokenResponse> {
        credentials.validate()?;

        let password = credentials.combined_password();
        let params = [
            ("grant_type", "password"),
            ("client_id", self.app.client_id.as_str()),
            ("client_secret", self.app.client_secret()),
            ("username", credentials.username.as_str()),
            ("password", password.as_str()),
        ];

        let token = self
            .post_token_request(self.token_url(credentials.is_sandbox), &params)
            .await?;
        debug!(instance_url = %token.instance_url, "Authenticated with password grant");
        Ok(token)
    }

    /// Refresh an access token using a refresh token.
    ///
    /// The refresh_token parameter is not logged to prevent credential exposure.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_token(&self, refresh_token: &str, is_sandbox: bool) -> Result<TokenResponse> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.app.client_id.as_str()),
            ("client_secret", self.app.client_secret()),
        ];

        self.post_token_request(self.token_url(is_sandbox), &params)
            .await
    }

    async fn post_token_request(&self, url: String, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let body = serde_urlencoded::to_string(params)?;

        let response = self
            .http_client
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;

        self.handle_token_response(response).await
    }

    /// Handle a token response, checking for errors.
    async fn handle_token_response(&self, response: reqwest::Response) -> Result<TokenResponse> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            let error = serde_json::from_str::<OAuthErrorResponse>(&body).unwrap_or_else(|_| {
                OAuthErrorResponse {
                    error: format!("http_{}", status),
                    error_description: "Token request failed".to_string(),
                }
            });
            return Err(Error::new(ErrorKind::OAuth {
                error: error.error,
                description: error.error_description,
            }));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token)
    }
}

/// Token response from OAuth.
///
/// Sensitive fields like `access_token` and `refresh_token` are redacted
/// in Debug output to prevent accidental exposure in logs.
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token (if requested).
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Instance URL.
    #[serde(default)]
    pub instance_url: String,
    /// User ID URL.
    #[serde(default)]
    pub id: Option<String>,
    /// Token type (usually "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,
    /// Issued at timestamp.
    #[serde(default)]
    pub issued_at: Option<String>,
    /// Signature for verification.
    #[serde(default)]
    pub signature: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("instance_url", &self.instance_url)
            .field("id", &self.id)
            .field("token_type", &self.token_type)
            .field("issued_at", &self.issued_at)
            .field("signature", &self.signature.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl TokenResponse {
    /// Convert to SalesforceCredentials.
    pub fn to_credentials(&self) -> SalesforceCredentials {
        let creds = SalesforceCredentials::new(&self.instance_url, &self.access_token);
        match &self.refresh_token {
            Some(rt) => creds.with_refresh_token(rt),
            None => creds,
        }
    }
}

/// OAuth error response.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}
