//! # actions-drip
//!
//! Drip destination actions: track events and create or update subscribers.
//!
//! Every request goes to `{endpoint}/{account_id}/...` with the API key as
//! HTTP Basic user name.
//!
//! ## Example
//!
//! ```rust,ignore
//! use actions_client::SfHttpClient;
//! use actions_drip::{DripClient, DripSettings, TrackEventPayload};
//!
//! let client = DripClient::new(
//!     DripSettings::new("api_key", "2445926"),
//!     SfHttpClient::default_client()?,
//! )?;
//!
//! client
//!     .track_event(&TrackEventPayload {
//!         event: "Signed Up".into(),
//!         user_id: Some("user123".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

mod client;
mod error;
mod payload;
mod settings;

pub use client::DripClient;
pub use error::{Error, ErrorKind, Result};
pub use payload::{IdentifyPayload, TrackEventPayload};
pub use settings::{DripSettings, DEFAULT_ENDPOINT};
