//! Flowrite Client - API bindings and a local cache of server collections.
//!
//! [`ApiClient`] is a thin typed wrapper over the HTTP/JSON API. [`ClientStore`]
//! keeps the last-fetched snapshot of customers, submissions and items and
//! refetches everything after each mutation it performs.
//!
//! ```rust,ignore
//! let mut store = ClientStore::new(ApiClient::new("http://localhost:3000")?);
//! store.login("owner@example.com", "hunter22").await?;
//! let docket = store.docket("Acme", start, end, LineItemOrder::Chronological)?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod api;
mod error;
mod store;

pub use api::{ApiClient, HealthStatus};
pub use error::ClientError;
pub use store::ClientStore;
