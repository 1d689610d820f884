//! Core types for Flowrite.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod delivery;
pub mod email;
pub mod id;

pub use amount::{Amount, AmountError};
pub use delivery::{DeliveryTime, parse_iso_date};
pub use email::{Email, EmailError};
pub use id::*;
