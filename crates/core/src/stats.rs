//! Per-owner submission aggregates.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::records::Submission;
use crate::types::{Amount, AmountError};

/// Aggregate numbers shown on the dashboard.
///
/// Serialized with snake_case keys, unlike the rest of the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStats {
    pub total_submissions: i64,
    pub total_amount: Amount,
    /// Distinct customer names across the owner's submissions.
    pub unique_customers: i64,
}

impl SubmissionStats {
    /// Compute stats over an owner's submissions.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Overflow` if the amounts cannot be totalled.
    pub fn from_submissions<'a>(
        submissions: impl IntoIterator<Item = &'a Submission>,
    ) -> Result<Self, AmountError> {
        let mut names = HashSet::new();
        let mut stats = Self::default();
        for submission in submissions {
            stats.total_submissions += 1;
            stats.total_amount = stats.total_amount.checked_add(submission.amount)?;
            names.insert(submission.customer_name.as_str());
        }
        stats.unique_customers = i64::try_from(names.len()).unwrap_or(i64::MAX);
        Ok(stats)
    }
}
