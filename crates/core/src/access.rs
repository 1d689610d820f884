//! Ownership-based access control.
//!
//! Every record kind reports its owner through [`Owned`]; [`authorize`] is the
//! single check run before any read, update or delete of a single record.

use thiserror::Error;

use crate::records::{Customer, Item, Submission};
use crate::types::AccountId;

/// Outcome of a failed access check.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// No record with the requested id exists.
    #[error("record not found")]
    NotFound,
    /// The record exists but belongs to another account.
    #[error("access denied")]
    Forbidden,
}

/// Records that belong to exactly one account.
pub trait Owned {
    /// The owning account.
    fn owner(&self) -> AccountId;
}

impl Owned for Customer {
    fn owner(&self) -> AccountId {
        self.owner_id
    }
}

impl Owned for Submission {
    fn owner(&self) -> AccountId {
        self.owner_id
    }
}

impl Owned for Item {
    fn owner(&self) -> AccountId {
        self.owner_id
    }
}

/// Check that `requester` may act on a fetched record.
///
/// # Errors
///
/// Returns `AccessError::NotFound` if the record is absent and
/// `AccessError::Forbidden` if it belongs to a different account.
pub fn authorize<R: Owned>(record: Option<R>, requester: AccountId) -> Result<R, AccessError> {
    let record = record.ok_or(AccessError::NotFound)?;
    if record.owner() != requester {
        return Err(AccessError::Forbidden);
    }
    Ok(record)
}
