//! Local cache of one account's collections.
//!
//! The cache never patches itself: every mutation goes to the server and is
//! followed by a full refetch, so the snapshot always mirrors server state as
//! of `last_refreshed`.

use chrono::{DateTime, NaiveDate, Utc};

use flowrite_core::{
    Account, Customer, CustomerId, CustomerInput, Docket, DocketPeriod, DocketSelector, Item,
    ItemId, ItemInput, LineItemOrder, Submission, SubmissionId, SubmissionInput, SubmissionStats,
};

use crate::api::ApiClient;
use crate::error::ClientError;

/// Cached customers, submissions and items for the signed-in account.
#[derive(Debug)]
pub struct ClientStore {
    api: ApiClient,
    account: Option<Account>,
    customers: Vec<Customer>,
    submissions: Vec<Submission>,
    items: Vec<Item>,
    last_refreshed: Option<DateTime<Utc>>,
}

impl ClientStore {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self {
            api,
            account: None,
            customers: Vec::new(),
            submissions: Vec::new(),
            items: Vec::new(),
            last_refreshed: None,
        }
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Customers ordered by name.
    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Submissions, most recent first.
    #[must_use]
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub const fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    /// Log in, then load every collection.
    ///
    /// # Errors
    ///
    /// Returns the login or refresh failure.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Account, ClientError> {
        let account = self.api.login(email, password).await?;
        self.signed_in(account).await
    }

    /// Register, then load every collection (all empty for a new account).
    ///
    /// # Errors
    ///
    /// Returns the registration or refresh failure.
    pub async fn register(&mut self, email: &str, password: &str) -> Result<&Account, ClientError> {
        let account = self.api.register(email, password).await?;
        self.signed_in(account).await
    }

    async fn signed_in(&mut self, account: Account) -> Result<&Account, ClientError> {
        tracing::info!(account_id = %account.id, "Signed in");
        self.refresh().await?;
        let account: &Account = self.account.insert(account);
        Ok(account)
    }

    /// Drop the token and every cached record.
    pub fn logout(&mut self) {
        self.api.set_token(None);
        self.account = None;
        self.customers.clear();
        self.submissions.clear();
        self.items.clear();
        self.last_refreshed = None;
    }

    /// Refetch all three collections concurrently.
    ///
    /// The snapshot is replaced only when every fetch succeeds.
    ///
    /// # Errors
    ///
    /// Returns the first failed fetch; the previous snapshot is kept.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let (customers, submissions, items) = tokio::try_join!(
            self.api.list_customers(),
            self.api.list_submissions(),
            self.api.list_items(),
        )?;
        tracing::debug!(
            customers = customers.len(),
            submissions = submissions.len(),
            items = items.len(),
            "Refreshed local cache"
        );
        self.customers = customers;
        self.submissions = submissions;
        self.items = items;
        self.last_refreshed = Some(Utc::now());
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn create_customer(&mut self, input: &CustomerInput) -> Result<Customer, ClientError> {
        let customer = self.api.create_customer(input).await?;
        self.refresh().await?;
        Ok(customer)
    }

    pub async fn update_customer(
        &mut self,
        id: CustomerId,
        input: &CustomerInput,
    ) -> Result<Customer, ClientError> {
        let customer = self.api.update_customer(id, input).await?;
        self.refresh().await?;
        Ok(customer)
    }

    pub async fn delete_customer(&mut self, id: CustomerId, cascade: bool) -> Result<u64, ClientError> {
        let removed = self.api.delete_customer(id, cascade).await?;
        self.refresh().await?;
        Ok(removed)
    }

    pub async fn create_submission(
        &mut self,
        input: &SubmissionInput,
    ) -> Result<Submission, ClientError> {
        let submission = self.api.create_submission(input).await?;
        self.refresh().await?;
        Ok(submission)
    }

    pub async fn update_submission(
        &mut self,
        id: SubmissionId,
        input: &SubmissionInput,
    ) -> Result<Submission, ClientError> {
        let submission = self.api.update_submission(id, input).await?;
        self.refresh().await?;
        Ok(submission)
    }

    pub async fn delete_submission(&mut self, id: SubmissionId) -> Result<(), ClientError> {
        self.api.delete_submission(id).await?;
        self.refresh().await
    }

    pub async fn delete_submissions_for_customer(&mut self, name: &str) -> Result<u64, ClientError> {
        let removed = self.api.delete_submissions_for_customer(name).await?;
        self.refresh().await?;
        Ok(removed)
    }

    pub async fn create_item(&mut self, input: &ItemInput) -> Result<Item, ClientError> {
        let item = self.api.create_item(input).await?;
        self.refresh().await?;
        Ok(item)
    }

    pub async fn update_item(&mut self, id: ItemId, input: &ItemInput) -> Result<Item, ClientError> {
        let item = self.api.update_item(id, input).await?;
        self.refresh().await?;
        Ok(item)
    }

    pub async fn delete_item(&mut self, id: ItemId) -> Result<(), ClientError> {
        self.api.delete_item(id).await?;
        self.refresh().await
    }

    // =========================================================================
    // Local queries
    // =========================================================================

    /// Stats over the cached submissions.
    pub fn stats(&self) -> Result<SubmissionStats, ClientError> {
        Ok(SubmissionStats::from_submissions(&self.submissions)?)
    }

    /// Cached submissions dated within `[start, end]`, most recent first.
    #[must_use]
    pub fn submissions_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Submission> {
        let period = DocketPeriod::new(start, end);
        self.submissions
            .iter()
            .filter(|s| period.contains(s.date))
            .collect()
    }

    /// First cached customer with exactly this name.
    #[must_use]
    pub fn customer_named(&self, name: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.name == name)
    }

    /// Generate a docket from the cache, without a round trip.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Docket` when nothing matches.
    pub fn docket(
        &self,
        customer_name: &str,
        start: NaiveDate,
        end: NaiveDate,
        order: LineItemOrder,
    ) -> Result<Docket, ClientError> {
        let selector = DocketSelector {
            name: customer_name.to_owned(),
            customer_id: self.customer_named(customer_name).map(|c| c.id),
        };
        Ok(Docket::generate(
            &selector,
            DocketPeriod::new(start, end),
            &self.submissions,
            &self.customers,
            order,
        )?)
    }
}
