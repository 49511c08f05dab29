//! Item repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use larkspur_core::{ItemId, Price, UserId};

use super::RepositoryError;
use crate::models::Item;

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    user_id: i64,
    name: String,
    price_cents: i64,
    body: String,
    image_path: Option<String>,
    created_at: DateTime<Utc>,
}

impl ItemRow {
    fn into_item(self) -> Result<Item, RepositoryError> {
        let price = Price::from_cents(self.price_cents).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Item {
            id: ItemId::new(self.id),
            user_id: UserId::new(self.user_id),
            name: self.name,
            price,
            body: self.body,
            image_path: self.image_path,
            created_at: self.created_at,
        })
    }
}

/// Repository for item database operations.
pub struct ItemRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all items in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, user_id, name, price_cents, body, image_path, created_at
            FROM items
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    /// Get an item by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, user_id, name, price_cents, body, image_path, created_at
            FROM items
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ItemRow::into_item).transpose()
    }

    /// Create a new item owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        name: &str,
        price: Price,
        body: &str,
        image_path: &str,
    ) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            INSERT INTO items (user_id, name, price_cents, body, image_path, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, user_id, name, price_cents, body, image_path, created_at
            ",
        )
        .bind(user_id)
        .bind(name)
        .bind(price)
        .bind(body)
        .bind(image_path)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("item name already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_item()
    }

    /// Update an item's name, price, and body; replace the image path only
    /// when a new one is provided.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new name is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ItemId,
        name: &str,
        price: Price,
        body: &str,
        new_image_path: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE items
            SET name = ?1,
                price_cents = ?2,
                body = ?3,
                image_path = COALESCE(?4, image_path)
            WHERE id = ?5
            ",
        )
        .bind(name)
        .bind(price)
        .bind(body)
        .bind(new_image_path)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("item name already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete an item by its ID. Dependent comments cascade.
    ///
    /// # Returns
    ///
    /// Returns `true` if the item was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
