//! `PostgreSQL` backend.
//!
//! [`PgStore`] owns the pool and hands each call to a short-lived repository
//! borrowing it.

mod accounts;
mod customers;
mod items;
mod submissions;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use flowrite_core::{
    Account, AccountId, Customer, CustomerFields, CustomerId, Email, Item, ItemFields, ItemId,
    Page, Submission, SubmissionFields, SubmissionId, SubmissionStats,
};

pub use accounts::AccountRepository;
pub use customers::CustomerRepository;
pub use items::ItemRepository;
pub use submissions::SubmissionRepository;

use super::{AccountCredentials, RepositoryError, Store};

/// Record store backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    const fn accounts(&self) -> AccountRepository<'_> {
        AccountRepository::new(&self.pool)
    }

    const fn customers(&self) -> CustomerRepository<'_> {
        CustomerRepository::new(&self.pool)
    }

    const fn submissions(&self) -> SubmissionRepository<'_> {
        SubmissionRepository::new(&self.pool)
    }

    const fn items(&self) -> ItemRepository<'_> {
        ItemRepository::new(&self.pool)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_account(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        self.accounts().create(email, password_hash).await
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        self.accounts().get_by_id(id).await
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<AccountCredentials>, RepositoryError> {
        self.accounts().get_credentials(email).await
    }

    async fn create_customer(
        &self,
        owner: AccountId,
        fields: &CustomerFields,
    ) -> Result<Customer, RepositoryError> {
        self.customers().create(owner, fields).await
    }

    async fn list_customers(
        &self,
        owner: AccountId,
        page: Page,
    ) -> Result<Vec<Customer>, RepositoryError> {
        self.customers().list(owner, page).await
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.customers().get_by_id(id).await
    }

    async fn update_customer(
        &self,
        owner: AccountId,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> Result<Customer, RepositoryError> {
        self.customers().update(owner, id, fields).await
    }

    async fn delete_customer(
        &self,
        owner: AccountId,
        id: CustomerId,
        cascade: bool,
    ) -> Result<u64, RepositoryError> {
        self.customers().delete(owner, id, cascade).await
    }

    async fn search_customers(
        &self,
        owner: AccountId,
        query: &str,
    ) -> Result<Vec<Customer>, RepositoryError> {
        self.customers().search(owner, query).await
    }

    async fn find_customer_by_name(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        self.customers().find_by_name(owner, name).await
    }

    async fn create_submission(
        &self,
        owner: AccountId,
        fields: &SubmissionFields,
    ) -> Result<Submission, RepositoryError> {
        self.submissions().create(owner, fields).await
    }

    async fn list_submissions(
        &self,
        owner: AccountId,
        page: Page,
    ) -> Result<Vec<Submission>, RepositoryError> {
        self.submissions().list(owner, page).await
    }

    async fn get_submission(
        &self,
        id: SubmissionId,
    ) -> Result<Option<Submission>, RepositoryError> {
        self.submissions().get_by_id(id).await
    }

    async fn update_submission(
        &self,
        owner: AccountId,
        id: SubmissionId,
        fields: &SubmissionFields,
    ) -> Result<Submission, RepositoryError> {
        self.submissions().update(owner, id, fields).await
    }

    async fn delete_submission(
        &self,
        owner: AccountId,
        id: SubmissionId,
    ) -> Result<(), RepositoryError> {
        self.submissions().delete(owner, id).await
    }

    async fn submissions_in_range(
        &self,
        owner: AccountId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Submission>, RepositoryError> {
        self.submissions().in_range(owner, start, end).await
    }

    async fn submissions_for_customer(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<Vec<Submission>, RepositoryError> {
        self.submissions().for_customer(owner, name).await
    }

    async fn delete_submissions_for_customer(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<u64, RepositoryError> {
        self.submissions().delete_for_customer(owner, name).await
    }

    async fn submission_stats(
        &self,
        owner: AccountId,
    ) -> Result<SubmissionStats, RepositoryError> {
        self.submissions().stats(owner).await
    }

    async fn create_item(
        &self,
        owner: AccountId,
        fields: &ItemFields,
    ) -> Result<Item, RepositoryError> {
        self.items().create(owner, fields).await
    }

    async fn list_items(
        &self,
        owner: AccountId,
        page: Page,
    ) -> Result<Vec<Item>, RepositoryError> {
        self.items().list(owner, page).await
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        self.items().get_by_id(id).await
    }

    async fn update_item(
        &self,
        owner: AccountId,
        id: ItemId,
        fields: &ItemFields,
    ) -> Result<Item, RepositoryError> {
        self.items().update(owner, id, fields).await
    }

    async fn delete_item(&self, owner: AccountId, id: ItemId) -> Result<(), RepositoryError> {
        self.items().delete(owner, id).await
    }
}
