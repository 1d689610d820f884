//! Stored records.
//!
//! These are the validated domain objects handed out by the record store.
//! Each one except [`Account`] belongs to exactly one owner account.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Amount, CustomerId, DeliveryTime, Email, ItemId, SubmissionId};

/// A registered account (the tenant boundary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Normalized login email.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A customer of the account holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    /// Owning account; immutable after creation.
    pub owner_id: AccountId,
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single delivery event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub owner_id: AccountId,
    /// Customer name as entered; the compatibility link to [`Customer`].
    pub customer_name: String,
    /// Link to the customer record, when one was resolved at write time.
    pub customer_id: Option<CustomerId>,
    pub date: NaiveDate,
    pub time: DeliveryTime,
    pub address: String,
    pub order_details: String,
    pub amount: Amount,
    pub rego: String,
    /// Base64 signature raster, optionally as a `data:` URL.
    pub signature_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// Ordering used by listings: most recent delivery first.
    #[must_use]
    pub fn most_recent_first(a: &Self, b: &Self) -> std::cmp::Ordering {
        b.date
            .cmp(&a.date)
            .then_with(|| b.time.sort_key().cmp(&a.time.sort_key()))
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// A catalog entry (material and unit of measure).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub owner_id: AccountId,
    pub name: String,
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fixtures {
    use super::*;

    pub fn submission(id: i32, name: &str, date: &str, time: &str, amount: &str) -> Submission {
        let now = Utc::now();
        Submission {
            id: SubmissionId::new(id),
            owner_id: AccountId::new(1),
            customer_name: name.to_owned(),
            customer_id: None,
            date: crate::types::parse_iso_date(date).unwrap(),
            time: DeliveryTime::new(time).unwrap(),
            address: "1 Quarry Rd".to_owned(),
            order_details: "Road Base".to_owned(),
            amount: amount.parse().unwrap(),
            rego: "ABC123".to_owned(),
            signature_image: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn customer(id: i32, name: &str) -> Customer {
        let now = Utc::now();
        Customer {
            id: CustomerId::new(id),
            owner_id: AccountId::new(1),
            name: name.to_owned(),
            email: None,
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }
}
