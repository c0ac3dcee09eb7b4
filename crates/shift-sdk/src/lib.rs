//! HTTP client SDK for the Shift API family.
//!
//! The server exposes several API families under path prefixes: the
//! external-application API (`ex-app`), the customer API (`customer-api`)
//! and any number of auxiliary APIs under caller-chosen prefixes. Each family
//! issues its own bearer token; this crate obtains, stores and sends them,
//! and maps failures to a typed [`Error`].
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use shift_sdk::{ShiftClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = ShiftClient::builder()
//!     .base_url("https://shift.example.com")
//!     .build()?;
//!
//! client.customer_api().create_token("alice", "hunter2").await?;
//!
//! match client
//!     .customer_api()
//!     .post("reservations", &json!({"date": "2024-05-01"}))
//!     .await
//! {
//!     Ok(reservation) => println!("{}", reservation),
//!     Err(e) if e.is_validation_error() => {
//!         println!("rejected: {:?}", client.validation_errors());
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Every call performs exactly one HTTP round trip. Nothing is retried and
//! tokens are never refreshed automatically: re-run token creation after an
//! [`Error::Unauthorized`].

pub mod api;
pub mod classify;
pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod normalize;
pub mod token;
pub mod types;

pub use client::{ClientBuilder, ShiftClient};
pub use config::SdkConfig;
pub use error::{CLIENT_ERROR_CODE, Error, ErrorKind, Result};
pub use types::*;

pub use api::{CustomerApi, ExternalAppApi, OtherApi};
