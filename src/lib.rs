//! Rust client for the [Tropipay](https://www.tropipay.com) payments API.
//!
//! The client owns the OAuth2 client-credentials lifecycle: it acquires an
//! access token on first use, caches it, attaches it to every call, and
//! refreshes it transparently when it nears expiry or the API rejects it as
//! unauthorized (one refresh and one retry per call, never more).
//!
//! ```rust,no_run
//! use tropipay::{Client, Environment};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), tropipay::Error> {
//! let client = Client::builder("client-id", "client-secret")
//!     .environment(Environment::Sandbox)
//!     .build()?;
//!
//! let profile = client.user_profile().await?;
//! println!("{} <{}>", profile.name, profile.email);
//! # Ok(())
//! # }
//! ```
//!
//! Dropping the future returned by any call aborts the in-flight request; a
//! token refresh shared with other calls is never aborted by a single
//! caller. All other retry decisions (backoff on 429, 5xx) belong to the
//! application; see [`Error::status`].

pub mod accounts;
mod auth;
pub mod cards;
mod client;
pub mod config;
pub mod deposit_accounts;
pub mod error;
pub mod movements;
pub mod users;

pub use client::{Client, ClientBuilder};
pub use config::Environment;
pub use error::Error;
