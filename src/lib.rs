//! # destination-actions
//!
//! Destination actions that forward analytics-event payloads to third-party
//! APIs.
//!
//! ## Crates
//!
//! - **actions-client** - HTTP request client with retry, rate limiting and error parsing
//! - **actions-sf-auth** - Salesforce username-password grant and credentials
//! - **actions-salesforce** - Salesforce record lookup, single-record operations and bulk ingest
//! - **actions-drip** - Drip event tracking and subscriber identify
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use destination_actions::client::SfHttpClient;
//! use destination_actions::salesforce::{GenericPayload, Salesforce, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let base = SfHttpClient::default_client()?;
//!     let sf = Salesforce::from_settings(&settings, base).await?;
//!
//!     let payloads: Vec<GenericPayload> = load_batch()?;
//!     sf.bulk_handler_with_sync_mode(&payloads, "Account", Some("upsert"), None)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[cfg(feature = "client")]
pub use actions_client as client;

#[cfg(feature = "salesforce")]
pub use actions_sf_auth as auth;

#[cfg(feature = "salesforce")]
pub use actions_salesforce as salesforce;

#[cfg(feature = "drip")]
pub use actions_drip as drip;
