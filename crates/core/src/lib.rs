//! Flowrite Core - Shared domain library.
//!
//! This crate provides the domain model used by every Flowrite component:
//! - `server` - HTTP/JSON API over the record store
//! - `client` - API client and local cache of server collections
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types, validation and pure functions - no I/O,
//! no database access, no HTTP clients. This keeps it lightweight and allows
//! the same rules (validation, ownership, docket totals) to run on both sides
//! of the wire.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, amounts and delivery times
//! - [`records`] - Stored records (accounts, customers, submissions, items)
//! - [`access`] - The ownership capability and the generic access check
//! - [`input`] - Request schemas and boundary validation
//! - [`stats`] - Per-owner submission aggregates
//! - [`docket`] - Docket aggregation
//! - [`envelope`] - The API response envelope shared by server and client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod docket;
pub mod envelope;
pub mod input;
pub mod records;
pub mod stats;
pub mod types;

pub use access::{AccessError, Owned, authorize};
pub use docket::{
    CustomerContact, Docket, DocketError, DocketLine, DocketPeriod, DocketSelector, LineItemOrder,
};
pub use envelope::Envelope;
pub use input::{
    CustomerFields, CustomerInput, FieldError, ItemFields, ItemInput, Page, PageQuery,
    SubmissionFields, SubmissionInput, ValidationErrors,
};
pub use records::{Account, Customer, Item, Submission};
pub use stats::SubmissionStats;
pub use types::*;
