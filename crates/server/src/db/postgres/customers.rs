//! Customer repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use flowrite_core::{AccountId, Customer, CustomerFields, CustomerId, Email, Page};

use crate::db::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    owner_id: i32,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid customer email in database: {e}"))
            })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            owner_id: AccountId::new(row.owner_id),
            name: row.name,
            email,
            phone: row.phone,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        owner: AccountId,
        fields: &CustomerFields,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO flowrite.customer (owner_id, name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, name, email, phone, address, created_at, updated_at
            ",
        )
        .bind(owner.as_i32())
        .bind(&fields.name)
        .bind(fields.email.as_ref().map(Email::as_str))
        .bind(fields.phone.as_deref())
        .bind(fields.address.as_deref())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// List an owner's customers by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, owner: AccountId, page: Page) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, owner_id, name, email, phone, address, created_at, updated_at
            FROM flowrite.customer
            WHERE owner_id = $1
            ORDER BY name COLLATE "C" ASC, id ASC
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

    /// Get a customer by ID, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, owner_id, name, email, phone, address, created_at, updated_at
            FROM flowrite.customer
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Replace a customer's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer matches id and owner.
    pub async fn update(
        &self,
        owner: AccountId,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            UPDATE flowrite.customer
            SET name = $3, email = $4, phone = $5, address = $6, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, email, phone, address, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(owner.as_i32())
        .bind(&fields.name)
        .bind(fields.email.as_ref().map(Email::as_str))
        .bind(fields.phone.as_deref())
        .bind(fields.address.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a customer, and with `cascade` its submissions, in one
    /// transaction. Without `cascade` linked submissions keep their name and
    /// lose the link.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer matches id and owner.
    pub async fn delete(
        &self,
        owner: AccountId,
        id: CustomerId,
        cascade: bool,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let name: String = sqlx::query_scalar(
            r"
            SELECT name FROM flowrite.customer
            WHERE id = $1 AND owner_id = $2
            FOR UPDATE
            ",
        )
        .bind(id.as_i32())
        .bind(owner.as_i32())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        // Must run before the customer row goes: its FK clears `customer_id`.
        let removed = if cascade {
            sqlx::query(
                r"
                DELETE FROM flowrite.submission
                WHERE owner_id = $1 AND (customer_id = $2 OR customer_name = $3)
                ",
            )
            .bind(owner.as_i32())
            .bind(id.as_i32())
            .bind(&name)
            .execute(&mut *tx)
            .await?
            .rows_affected()
        } else {
            0
        };

        sqlx::query("DELETE FROM flowrite.customer WHERE id = $1 AND owner_id = $2")
            .bind(id.as_i32())
            .bind(owner.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(removed)
    }

    /// Case-insensitive literal substring search.
    ///
    /// Uses `strpos` rather than `LIKE` so `%` and `_` in the query match
    /// themselves.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, owner: AccountId, query: &str) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, owner_id, name, email, phone, address, created_at, updated_at
            FROM flowrite.customer
            WHERE owner_id = $1
              AND (strpos(lower(name), $2) > 0
                   OR strpos(lower(COALESCE(email, '')), $2) > 0
                   OR strpos(lower(COALESCE(phone, '')), $2) > 0
                   OR strpos(lower(COALESCE(address, '')), $2) > 0)
            ORDER BY name COLLATE "C" ASC, id ASC
            "#,
        )
        .bind(owner.as_i32())
        .bind(query.to_lowercase())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// First customer with exactly this name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_name(
        &self,
        owner: AccountId,
        name: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, owner_id, name, email, phone, address, created_at, updated_at
            FROM flowrite.customer
            WHERE owner_id = $1 AND name = $2
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(owner.as_i32())
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}
