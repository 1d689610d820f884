//! Catalog item repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use flowrite_core::{AccountId, Item, ItemFields, ItemId, Page};

use crate::db::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i32,
    owner_id: i32,
    name: String,
    unit: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            owner_id: AccountId::new(row.owner_id),
            name: row.name,
            unit: row.unit,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for catalog item database operations.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, owner: AccountId, fields: &ItemFields) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            INSERT INTO flowrite.item (owner_id, name, unit)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, unit, created_at, updated_at
            ",
        )
        .bind(owner.as_i32())
        .bind(&fields.name)
        .bind(&fields.unit)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List an owner's items by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, owner: AccountId, page: Page) -> Result<Vec<Item>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, owner_id, name, unit, created_at, updated_at
            FROM flowrite.item
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

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an item by ID, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, owner_id, name, unit, created_at, updated_at
            FROM flowrite.item
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Replace an item's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item matches id and owner.
    pub async fn update(
        &self,
        owner: AccountId,
        id: ItemId,
        fields: &ItemFields,
    ) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            UPDATE flowrite.item
            SET name = $3, unit = $4, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, unit, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(owner.as_i32())
        .bind(&fields.name)
        .bind(&fields.unit)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item matches id and owner.
    pub async fn delete(&self, owner: AccountId, id: ItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM flowrite.item WHERE id = $1 AND owner_id = $2")
            .bind(id.as_i32())
            .bind(owner.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
