//! # actions-sf-auth
//!
//! Salesforce authentication for destination actions.
//!
//! ## Security
//!
//! - Secrets (passwords, security tokens, client secrets, access tokens) are
//!   redacted in Debug output
//! - Tracing skips credential parameters
//!
//! ## Supported Authentication Methods
//!
//! - **OAuth 2.0 Username-Password Flow** - For destinations configured with a
//!   username, password and security token instead of an OAuth connection
//! - **OAuth 2.0 Refresh Token** - For refreshing expired access tokens
//!
//! ## Example
//!
//! ```rust,ignore
//! use actions_sf_auth::{ConnectedApp, OAuthClient, PasswordCredentials};
//!
//! let app = ConnectedApp::from_env()?;
//! let creds = PasswordCredentials::new("user@example.com", "hunter2")
//!     .with_security_token("abc123")
//!     .sandbox(true);
//!
//! let token = OAuthClient::new(app).authenticate_with_password(&creds).await?;
//! println!("instance: {}", token.instance_url);
//! ```

mod credentials;
mod error;
mod oauth;

pub use credentials::{ConnectedApp, Credentials, PasswordCredentials, SalesforceCredentials};
pub use error::{Error, ErrorKind, Result};
pub use oauth::{OAuthClient, TokenResponse};

/// Default Salesforce login URL for production.
pub const PRODUCTION_LOGIN_URL: &str = "https://login.salesforce.com";

/// Default Salesforce login URL for sandbox.
pub const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";

/// Environment variable holding the connected app's consumer key.
pub const CLIENT_ID_ENV: &str = "SALESFORCE_CLIENT_ID";

/// Environment variable holding the connected app's consumer secret.
pub const CLIENT_SECRET_ENV: &str = "SALESFORCE_CLIENT_SECRET";

/// Login URL for an org: the sandbox host when `is_sandbox`, production otherwise.
pub fn login_url(is_sandbox: bool) -> &'static str {
    if is_sandbox {
        SANDBOX_LOGIN_URL
    } else {
        PRODUCTION_LOGIN_URL
    }
}
