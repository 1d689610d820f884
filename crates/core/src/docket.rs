//! Docket aggregation.
//!
//! A docket summarises one customer's deliveries over an inclusive date
//! range. Generation is pure over already-fetched records, so the server and
//! the client cache produce identical dockets from the same data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::records::{Customer, Submission};
use crate::types::{Amount, AmountError, CustomerId, DeliveryTime, Email, SubmissionId};

/// Errors that can occur when generating a docket.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocketError {
    /// Nothing matched the customer and period.
    #[error("No submissions found for this customer in the selected date range")]
    NoMatchingRecords,
    /// The line item amounts could not be totalled.
    #[error("Docket total could not be computed: {0}")]
    Total(#[from] AmountError),
}

/// Which customer a docket is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocketSelector {
    /// Exact customer name as recorded on submissions.
    pub name: String,
    /// Customer record; linked submissions match it regardless of name.
    pub customer_id: Option<CustomerId>,
}

impl DocketSelector {
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            customer_id: None,
        }
    }

    fn matches(&self, submission: &Submission) -> bool {
        let linked = self.customer_id.is_some() && submission.customer_id == self.customer_id;
        linked || submission.customer_name == self.name
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocketPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DocketPeriod {
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Both bounds inclusive. Empty when `start > end`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Line-item ordering on a docket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineItemOrder {
    /// Oldest delivery first.
    #[default]
    #[serde(rename = "asc")]
    Chronological,
    /// Newest delivery first, as returned by range queries.
    #[serde(rename = "desc")]
    MostRecentFirst,
}

/// Contact details copied from the customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerContact {
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// One delivery row on a docket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocketLine {
    pub submission_id: SubmissionId,
    pub date: NaiveDate,
    pub time: DeliveryTime,
    pub address: String,
    pub order_details: String,
    pub rego: String,
    pub amount: Amount,
}

impl From<&Submission> for DocketLine {
    fn from(s: &Submission) -> Self {
        Self {
            submission_id: s.id,
            date: s.date,
            time: s.time.clone(),
            address: s.address.clone(),
            order_details: s.order_details.clone(),
            rego: s.rego.clone(),
            amount: s.amount,
        }
    }
}

/// A generated docket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Docket {
    /// Fresh per generation, e.g. `D1718000000000-3f2a9c1b`.
    pub docket_number: String,
    pub customer_name: String,
    pub customer_contact: Option<CustomerContact>,
    pub period: DocketPeriod,
    pub line_items: Vec<DocketLine>,
    pub total: Amount,
    pub generated_at: DateTime<Utc>,
}

impl Docket {
    /// Build a docket from an owner's submissions and customers.
    ///
    /// # Errors
    ///
    /// Returns `DocketError::NoMatchingRecords` when no submission matches
    /// the selector within the period, and `DocketError::Total` when the
    /// amounts overflow.
    pub fn generate(
        selector: &DocketSelector,
        period: DocketPeriod,
        submissions: &[Submission],
        customers: &[Customer],
        order: LineItemOrder,
    ) -> Result<Self, DocketError> {
        let mut selected: Vec<&Submission> = submissions
            .iter()
            .filter(|s| period.contains(s.date) && selector.matches(s))
            .collect();
        if selected.is_empty() {
            return Err(DocketError::NoMatchingRecords);
        }

        match order {
            LineItemOrder::Chronological => {
                selected.sort_by(|a, b| Submission::most_recent_first(b, a));
            }
            LineItemOrder::MostRecentFirst => {
                selected.sort_by(|a, b| Submission::most_recent_first(a, b));
            }
        }

        let total = Amount::total(selected.iter().map(|s| s.amount))?;
        let customer_contact = customers
            .iter()
            .find(|c| c.name == selector.name)
            .map(|c| CustomerContact {
                email: c.email.clone(),
                phone: c.phone.clone(),
                address: c.address.clone(),
            });

        let generated_at = Utc::now();
        Ok(Self {
            docket_number: docket_number(generated_at),
            customer_name: selector.name.clone(),
            customer_contact,
            period,
            line_items: selected.into_iter().map(DocketLine::from).collect(),
            total,
            generated_at,
        })
    }
}

fn docket_number(at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("D{}-{}", at.timestamp_millis(), &suffix[..8])
}
