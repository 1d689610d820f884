//! Submission repository.
//!
//! Listings order by `date DESC, time_of_day DESC NULLS LAST, time DESC, id DESC`,
//! the same order as `Submission::most_recent_first`. The raw `time` text is
//! compared byte-wise (`COLLATE "C"`) to match Rust string ordering.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use flowrite_core::{
    AccountId, Amount, CustomerId, DeliveryTime, Page, Submission, SubmissionFields, SubmissionId,
    SubmissionStats,
};

use crate::db::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct SubmissionRow {
    id: i32,
    owner_id: i32,
    customer_name: String,
    customer_id: Option<i32>,
    date: NaiveDate,
    time: String,
    address: String,
    order_details: String,
    amount: Decimal,
    rego: String,
    signature_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = RepositoryError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let time = DeliveryTime::new(&row.time).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("empty time on submission {}", row.id))
        })?;
        let amount = Amount::new(row.amount).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid amount on submission {}: {e}", row.id))
        })?;

        Ok(Self {
            id: SubmissionId::new(row.id),
            owner_id: AccountId::new(row.owner_id),
            customer_name: row.customer_name,
            customer_id: row.customer_id.map(CustomerId::new),
            date: row.date,
            time,
            address: row.address,
            order_details: row.order_details,
            amount,
            rego: row.rego,
            signature_image: row.signature_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_submissions: i64,
    total_amount: Decimal,
    unique_customers: i64,
}

/// Repository for submission database operations.
pub struct SubmissionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubmissionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        owner: AccountId,
        fields: &SubmissionFields,
    ) -> Result<Submission, RepositoryError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r"
            INSERT INTO flowrite.submission
                (owner_id, customer_name, customer_id, date, time, time_of_day,
                 address, order_details, amount, rego, signature_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, owner_id, customer_name, customer_id, date, time, address,
                      order_details, amount, rego, signature_image, created_at, updated_at
            ",
        )
        .bind(owner.as_i32())
        .bind(&fields.customer_name)
        .bind(fields.customer_id.map(|id| id.as_i32()))
        .bind(fields.date)
        .bind(fields.time.as_str())
        .bind(fields.time.time_of_day())
        .bind(&fields.address)
        .bind(&fields.order_details)
        .bind(fields.amount.as_decimal())
        .bind(&fields.rego)
        .bind(fields.signature_image.as_deref())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// List an owner's submissions, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, owner: AccountId, page: Page) -> Result<Vec<Submission>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, owner_id, customer_name, customer_id, date, time, address,
                   order_details, amount, rego, signature_image, created_at, updated_at
            FROM flowrite.submission
            WHERE owner_id = $1
            ORDER BY date DESC, time_of_day DESC NULLS LAST, time COLLATE "C" DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner.as_i32())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a submission by ID, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r"
            SELECT id, owner_id, customer_name, customer_id, date, time, address,
                   order_details, amount, rego, signature_image, created_at, updated_at
            FROM flowrite.submission
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Replace a submission's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no submission matches id and owner.
    pub async fn update(
        &self,
        owner: AccountId,
        id: SubmissionId,
        fields: &SubmissionFields,
    ) -> Result<Submission, RepositoryError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r"
            UPDATE flowrite.submission
            SET customer_name = $3, customer_id = $4, date = $5, time = $6,
                time_of_day = $7, address = $8, order_details = $9, amount = $10,
                rego = $11, signature_image = $12, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, customer_name, customer_id, date, time, address,
                      order_details, amount, rego, signature_image, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(owner.as_i32())
        .bind(&fields.customer_name)
        .bind(fields.customer_id.map(|id| id.as_i32()))
        .bind(fields.date)
        .bind(fields.time.as_str())
        .bind(fields.time.time_of_day())
        .bind(&fields.address)
        .bind(&fields.order_details)
        .bind(fields.amount.as_decimal())
        .bind(&fields.rego)
        .bind(fields.signature_image.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete one submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no submission matches id and owner.
    pub async fn delete(&self, owner: AccountId, id: SubmissionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM flowrite.submission WHERE id = $1 AND owner_id = $2")
            .bind(id.as_i32())
            .bind(owner.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Submissions dated within `[start, end]`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn in_range(
        &self,
        owner: AccountId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, owner_id, customer_name, customer_id, date, time, address,
                   order_details, amount, rego, signature_image, created_at, updated_at
            FROM flowrite.submission
            WHERE owner_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date DESC, time_of_day DESC NULLS LAST, time COLLATE "C" DESC, id DESC
            "#,
        )
        .bind(owner.as_i32())
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Submissions with exactly this customer name, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_customer(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, owner_id, customer_name, customer_id, date, time, address,
                   order_details, amount, rego, signature_image, created_at, updated_at
            FROM flowrite.submission
            WHERE owner_id = $1 AND customer_name = $2
            ORDER BY date DESC, time_of_day DESC NULLS LAST, time COLLATE "C" DESC, id DESC
            "#,
        )
        .bind(owner.as_i32())
        .bind(name)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete every submission with this customer name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_for_customer(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM flowrite.submission WHERE owner_id = $1 AND customer_name = $2")
                .bind(owner.as_i32())
                .bind(name)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Aggregate counts for an owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self, owner: AccountId) -> Result<SubmissionStats, RepositoryError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r"
            SELECT COUNT(*) AS total_submissions,
                   COALESCE(SUM(amount), 0) AS total_amount,
                   COUNT(DISTINCT customer_name) AS unique_customers
            FROM flowrite.submission
            WHERE owner_id = $1
            ",
        )
        .bind(owner.as_i32())
        .fetch_one(self.pool)
        .await?;

        let total_amount = Amount::new(row.total_amount).map_err(|e| {
            RepositoryError::DataCorruption(format!("negative submission total: {e}"))
        })?;

        Ok(SubmissionStats {
            total_submissions: row.total_submissions,
            total_amount,
            unique_customers: row.unique_customers,
        })
    }
}
