//! Record store: the `Store` trait and its backends.
//!
//! # Backends
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryStore`] - process-local maps behind a lock (tests, demos)
//!
//! Every query that returns records of a kind is scoped by owner. Single-record
//! reads (`get_*`) are not: they return whatever exists so the access layer can
//! tell "absent" from "someone else's". Updates and deletes take the owner and
//! only touch a row that matches both id and owner.
//!
//! # Tables (`flowrite` schema)
//!
//! - `account` - Login identity and argon2 password hash
//! - `customer` - Customers per account
//! - `submission` - Deliveries per account, optionally linked to a customer
//! - `item` - Catalog entries per account
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p flowrite-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use flowrite_core::{
    Account, AccountId, Customer, CustomerFields, CustomerId, Email, Item, ItemFields, ItemId,
    Page, Submission, SubmissionFields, SubmissionId, SubmissionStats,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to `Conflict`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// An account together with its stored password hash.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account: Account,
    pub password_hash: String,
}

/// Persistence operations used by the services.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for health output (`postgres`, `memory`).
    fn backend(&self) -> &'static str;

    /// Check that the backend can serve queries.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // ─────────────────────────────── Accounts ───────────────────────────────

    /// Create an account. `Conflict` if the email is taken.
    async fn create_account(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<Account, RepositoryError>;

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<AccountCredentials>, RepositoryError>;

    // ─────────────────────────────── Customers ──────────────────────────────

    async fn create_customer(
        &self,
        owner: AccountId,
        fields: &CustomerFields,
    ) -> Result<Customer, RepositoryError>;

    /// Customers by name ascending.
    async fn list_customers(
        &self,
        owner: AccountId,
        page: Page,
    ) -> Result<Vec<Customer>, RepositoryError>;

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Replace all fields. `NotFound` if no row matches id and owner.
    async fn update_customer(
        &self,
        owner: AccountId,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> Result<Customer, RepositoryError>;

    /// Delete a customer, optionally with its submissions (linked by id or
    /// by exact name). Returns the number of submissions removed.
    async fn delete_customer(
        &self,
        owner: AccountId,
        id: CustomerId,
        cascade: bool,
    ) -> Result<u64, RepositoryError>;

    /// Case-insensitive literal substring match over name, email, phone and
    /// address; sorted by name.
    async fn search_customers(
        &self,
        owner: AccountId,
        query: &str,
    ) -> Result<Vec<Customer>, RepositoryError>;

    /// First customer (by id) whose name matches exactly.
    async fn find_customer_by_name(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<Option<Customer>, RepositoryError>;

    // ────────────────────────────── Submissions ─────────────────────────────

    async fn create_submission(
        &self,
        owner: AccountId,
        fields: &SubmissionFields,
    ) -> Result<Submission, RepositoryError>;

    /// Most recent delivery first.
    async fn list_submissions(
        &self,
        owner: AccountId,
        page: Page,
    ) -> Result<Vec<Submission>, RepositoryError>;

    async fn get_submission(&self, id: SubmissionId)
    -> Result<Option<Submission>, RepositoryError>;

    async fn update_submission(
        &self,
        owner: AccountId,
        id: SubmissionId,
        fields: &SubmissionFields,
    ) -> Result<Submission, RepositoryError>;

    async fn delete_submission(
        &self,
        owner: AccountId,
        id: SubmissionId,
    ) -> Result<(), RepositoryError>;

    /// Both bounds inclusive, most recent first. Empty when `start > end`.
    async fn submissions_in_range(
        &self,
        owner: AccountId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Submission>, RepositoryError>;

    /// Exact customer-name match, most recent first.
    async fn submissions_for_customer(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<Vec<Submission>, RepositoryError>;

    /// Remove every submission with this exact customer name. Idempotent.
    async fn delete_submissions_for_customer(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<u64, RepositoryError>;

    async fn submission_stats(&self, owner: AccountId)
    -> Result<SubmissionStats, RepositoryError>;

    // ──────────────────────────────── Items ─────────────────────────────────

    async fn create_item(
        &self,
        owner: AccountId,
        fields: &ItemFields,
    ) -> Result<Item, RepositoryError>;

    /// Items by name ascending.
    async fn list_items(&self, owner: AccountId, page: Page)
    -> Result<Vec<Item>, RepositoryError>;

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;

    async fn update_item(
        &self,
        owner: AccountId,
        id: ItemId,
        fields: &ItemFields,
    ) -> Result<Item, RepositoryError>;

    async fn delete_item(&self, owner: AccountId, id: ItemId) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
