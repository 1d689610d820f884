//! Record service: owner-scoped CRUD over customers, submissions and items.
//!
//! Every single-record read, update and delete first fetches the record and
//! runs it through [`authorize`]; the store mutation then also filters by
//! owner, so a record deleted in between surfaces as `NotFound`.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use flowrite_core::{
    AccessError, AccountId, Customer, CustomerId, CustomerInput, Docket, DocketError,
    DocketPeriod, DocketSelector, Item, ItemId, ItemInput, LineItemOrder, Owned, Page,
    Submission, SubmissionFields, SubmissionId, SubmissionInput, SubmissionStats,
    ValidationErrors, authorize, parse_iso_date,
};

use crate::db::{RepositoryError, Store};

/// Errors from record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    /// No record of this kind with the requested id.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The record belongs to another account.
    #[error("Access denied")]
    Forbidden,

    /// Malformed query parameters.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Docket(#[from] DocketError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl RecordError {
    fn from_store(e: RepositoryError, kind: &'static str) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound(kind),
            other => Self::Repository(other),
        }
    }
}

fn authorized<R: Owned>(
    record: Option<R>,
    requester: AccountId,
    kind: &'static str,
) -> Result<R, RecordError> {
    authorize(record, requester).map_err(|e| match e {
        AccessError::NotFound => RecordError::NotFound(kind),
        AccessError::Forbidden => {
            tracing::warn!(account_id = %requester, kind, "Cross-account access denied");
            RecordError::Forbidden
        }
    })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an inclusive `startDate`/`endDate` pair.
///
/// # Errors
///
/// Returns `RecordError::BadRequest` if a bound is missing or not `YYYY-MM-DD`.
pub fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(NaiveDate, NaiveDate), RecordError> {
    let (Some(start), Some(end)) = (present(start), present(end)) else {
        return Err(RecordError::BadRequest(
            "startDate and endDate are required".to_owned(),
        ));
    };

    let parse = |v: &str| {
        parse_iso_date(v).map_err(|_| {
            RecordError::BadRequest(format!("Invalid date '{v}', expected YYYY-MM-DD"))
        })
    };
    Ok((parse(start)?, parse(end)?))
}

/// `GET /api/dockets` query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocketQuery {
    pub customer_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub order: LineItemOrder,
}

/// Owner-scoped record operations.
pub struct RecordService<'a> {
    store: &'a dyn Store,
}

impl<'a> RecordService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn list_customers(
        &self,
        owner: AccountId,
        page: Page,
    ) -> Result<Vec<Customer>, RecordError> {
        Ok(self.store.list_customers(owner, page).await?)
    }

    /// Substring search over the owner's customers.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::BadRequest` for a blank query.
    pub async fn search_customers(
        &self,
        owner: AccountId,
        query: Option<&str>,
    ) -> Result<Vec<Customer>, RecordError> {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| RecordError::BadRequest("Search query is required".to_owned()))?;
        Ok(self.store.search_customers(owner, query).await?)
    }

    pub async fn get_customer(
        &self,
        owner: AccountId,
        id: CustomerId,
    ) -> Result<Customer, RecordError> {
        authorized(self.store.get_customer(id).await?, owner, "Customer")
    }

    pub async fn create_customer(
        &self,
        owner: AccountId,
        input: CustomerInput,
    ) -> Result<Customer, RecordError> {
        let fields = input.validate()?;
        let customer = self.store.create_customer(owner, &fields).await?;
        tracing::info!(account_id = %owner, customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn update_customer(
        &self,
        owner: AccountId,
        id: CustomerId,
        input: CustomerInput,
    ) -> Result<Customer, RecordError> {
        self.get_customer(owner, id).await?;
        let fields = input.validate()?;
        self.store
            .update_customer(owner, id, &fields)
            .await
            .map_err(|e| RecordError::from_store(e, "Customer"))
    }

    /// Delete a customer; returns how many submissions went with it.
    pub async fn delete_customer(
        &self,
        owner: AccountId,
        id: CustomerId,
        cascade: bool,
    ) -> Result<u64, RecordError> {
        self.get_customer(owner, id).await?;
        let removed = self
            .store
            .delete_customer(owner, id, cascade)
            .await
            .map_err(|e| RecordError::from_store(e, "Customer"))?;
        tracing::info!(
            account_id = %owner,
            customer_id = %id,
            cascade,
            deleted_submissions = removed,
            "Customer deleted"
        );
        Ok(removed)
    }

    // =========================================================================
    // Submissions
    // =========================================================================

    pub async fn list_submissions(
        &self,
        owner: AccountId,
        page: Page,
    ) -> Result<Vec<Submission>, RecordError> {
        Ok(self.store.list_submissions(owner, page).await?)
    }

    pub async fn submission_stats(&self, owner: AccountId) -> Result<SubmissionStats, RecordError> {
        Ok(self.store.submission_stats(owner).await?)
    }

    /// Submissions dated within an inclusive range.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::BadRequest` for a missing or malformed bound.
    pub async fn submissions_in_range(
        &self,
        owner: AccountId,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Submission>, RecordError> {
        let (start, end) = parse_range(start, end)?;
        Ok(self.store.submissions_in_range(owner, start, end).await?)
    }

    pub async fn submissions_for_customer(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<Vec<Submission>, RecordError> {
        Ok(self.store.submissions_for_customer(owner, name).await?)
    }

    pub async fn delete_submissions_for_customer(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<u64, RecordError> {
        let removed = self.store.delete_submissions_for_customer(owner, name).await?;
        tracing::info!(account_id = %owner, removed, "Submissions deleted by customer name");
        Ok(removed)
    }

    pub async fn get_submission(
        &self,
        owner: AccountId,
        id: SubmissionId,
    ) -> Result<Submission, RecordError> {
        authorized(self.store.get_submission(id).await?, owner, "Submission")
    }

    pub async fn create_submission(
        &self,
        owner: AccountId,
        input: SubmissionInput,
    ) -> Result<Submission, RecordError> {
        let fields = self.link_customer(owner, input.validate()?).await?;
        let submission = self.store.create_submission(owner, &fields).await?;
        tracing::info!(
            account_id = %owner,
            submission_id = %submission.id,
            linked = submission.customer_id.is_some(),
            "Submission created"
        );
        Ok(submission)
    }

    pub async fn update_submission(
        &self,
        owner: AccountId,
        id: SubmissionId,
        input: SubmissionInput,
    ) -> Result<Submission, RecordError> {
        self.get_submission(owner, id).await?;
        let fields = self.link_customer(owner, input.validate()?).await?;
        self.store
            .update_submission(owner, id, &fields)
            .await
            .map_err(|e| RecordError::from_store(e, "Submission"))
    }

    pub async fn delete_submission(
        &self,
        owner: AccountId,
        id: SubmissionId,
    ) -> Result<(), RecordError> {
        self.get_submission(owner, id).await?;
        self.store
            .delete_submission(owner, id)
            .await
            .map_err(|e| RecordError::from_store(e, "Submission"))
    }

    /// Resolve the customer link: an explicit id must belong to the owner,
    /// otherwise link by exact name when such a customer exists.
    async fn link_customer(
        &self,
        owner: AccountId,
        mut fields: SubmissionFields,
    ) -> Result<SubmissionFields, RecordError> {
        match fields.customer_id {
            Some(id) => {
                let owned = self
                    .store
                    .get_customer(id)
                    .await?
                    .is_some_and(|c| c.owner_id == owner);
                if !owned {
                    return Err(ValidationErrors::single("customerId", "Customer not found").into());
                }
            }
            None => {
                fields.customer_id = self
                    .store
                    .find_customer_by_name(owner, &fields.customer_name)
                    .await?
                    .map(|c| c.id);
            }
        }
        Ok(fields)
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub async fn list_items(&self, owner: AccountId, page: Page) -> Result<Vec<Item>, RecordError> {
        Ok(self.store.list_items(owner, page).await?)
    }

    pub async fn get_item(&self, owner: AccountId, id: ItemId) -> Result<Item, RecordError> {
        authorized(self.store.get_item(id).await?, owner, "Item")
    }

    pub async fn create_item(&self, owner: AccountId, input: ItemInput) -> Result<Item, RecordError> {
        let fields = input.validate()?;
        Ok(self.store.create_item(owner, &fields).await?)
    }

    pub async fn update_item(
        &self,
        owner: AccountId,
        id: ItemId,
        input: ItemInput,
    ) -> Result<Item, RecordError> {
        self.get_item(owner, id).await?;
        let fields = input.validate()?;
        self.store
            .update_item(owner, id, &fields)
            .await
            .map_err(|e| RecordError::from_store(e, "Item"))
    }

    pub async fn delete_item(&self, owner: AccountId, id: ItemId) -> Result<(), RecordError> {
        self.get_item(owner, id).await?;
        self.store
            .delete_item(owner, id)
            .await
            .map_err(|e| RecordError::from_store(e, "Item"))
    }

    // =========================================================================
    // Dockets
    // =========================================================================

    /// Generate a docket for one customer over an inclusive date range.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::BadRequest` for a missing customer name or bad
    /// range, and `RecordError::Docket` when nothing matches.
    pub async fn docket(&self, owner: AccountId, query: DocketQuery) -> Result<Docket, RecordError> {
        let name = query
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| RecordError::BadRequest("customerName is required".to_owned()))?;
        let (start, end) = parse_range(query.start_date.as_deref(), query.end_date.as_deref())?;

        let submissions = self.store.submissions_in_range(owner, start, end).await?;
        let customer = self.store.find_customer_by_name(owner, name).await?;
        let selector = DocketSelector {
            name: name.to_owned(),
            customer_id: customer.as_ref().map(|c| c.id),
        };
        let customers: Vec<Customer> = customer.into_iter().collect();

        let docket = Docket::generate(
            &selector,
            DocketPeriod::new(start, end),
            &submissions,
            &customers,
            query.order,
        )?;
        tracing::info!(
            account_id = %owner,
            docket_number = %docket.docket_number,
            line_items = docket.line_items.len(),
            "Docket generated"
        );
        Ok(docket)
    }
}
