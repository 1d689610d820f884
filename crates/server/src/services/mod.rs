//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Account registration, login and bearer tokens
//! - `records` - Owner-scoped customers, submissions, items and dockets

pub mod auth;
pub mod records;

pub use auth::{AuthError, AuthService, TokenKeys};
pub use records::{RecordError, RecordService};
