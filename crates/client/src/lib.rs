//! # actions-client
//!
//! HTTP request client shared by every destination action.
//!
//! Destinations never talk to `reqwest` directly. They build a
//! [`RequestBuilder`], hand it to something implementing [`RequestClient`]
//! and get back a fully buffered [`Response`]. The production implementation
//! is [`SfHttpClient`], which adds:
//! - Retry with exponential backoff and jitter
//! - Compressed responses
//! - Rate limit detection (429 + `Retry-After`)
//! - Default headers / bearer token on every request
//! - Salesforce error-array parsing with token redaction
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Destination Layer                        │
//! │  (actions-salesforce, actions-drip)                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  RequestClient
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SfHttpClient                             │
//! │  - Raw HTTP with retry, compression, rate limiting          │
//! │  - Default auth headers                                     │
//! │  - Buffered responses, error parsing                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use actions_client::{ClientConfig, RequestClient, SfHttpClient};
//!
//! let client = SfHttpClient::new(ClientConfig::default())?
//!     .with_bearer_auth("access_token");
//!
//! let response = client
//!     .execute(client.get("https://myorg.my.salesforce.com/services/data/v53.0/sobjects"))
//!     .await?;
//! let body: serde_json::Value = response.json()?;
//! ```

mod client;
mod config;
mod error;
mod request;
mod requester;
mod response;
mod retry;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use requester::RequestClient;
pub use response::{ApiUsage, Response};
pub use retry::{BackoffStrategy, RetryConfig, RetryPolicy};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("destination-actions/", env!("CARGO_PKG_VERSION"));
