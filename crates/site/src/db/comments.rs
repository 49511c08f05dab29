//! Comment repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use larkspur_core::{CommentId, Email, ItemId, UserId};

use super::RepositoryError;
use crate::models::{Comment, CommentWithAuthor};

/// Repository for comment database operations.
pub struct CommentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Attach a new comment to an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including
    /// foreign key violations for a missing author or item).
    pub async fn create(
        &self,
        user_id: UserId,
        item_id: ItemId,
        body: &str,
    ) -> Result<Comment, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct CommentRow {
            id: i64,
            body: String,
            user_id: i64,
            item_id: i64,
            created_at: DateTime<Utc>,
        }

        let row = sqlx::query_as::<_, CommentRow>(
            r"
            INSERT INTO comments (body, user_id, item_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, body, user_id, item_id, created_at
            ",
        )
        .bind(body)
        .bind(user_id)
        .bind(item_id)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(Comment {
            id: CommentId::new(row.id),
            body: row.body,
            user_id: UserId::new(row.user_id),
            item_id: ItemId::new(row.item_id),
            created_at: row.created_at,
        })
    }

    /// List an item's comments with their authors, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if an author email is invalid.
    pub async fn list_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<CommentWithAuthor>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct CommentAuthorRow {
            id: i64,
            body: String,
            author_name: String,
            author_email: String,
            created_at: DateTime<Utc>,
        }

        let rows = sqlx::query_as::<_, CommentAuthorRow>(
            r"
            SELECT c.id, c.body, u.name AS author_name, u.email AS author_email, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.item_id = ?1
            ORDER BY c.id ASC
            ",
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await?;

        let mut comments = Vec::with_capacity(rows.len());
        for r in rows {
            let author_email = Email::parse(&r.author_email).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

            comments.push(CommentWithAuthor {
                id: CommentId::new(r.id),
                body: r.body,
                author_name: r.author_name,
                author_email,
                created_at: r.created_at,
            });
        }

        Ok(comments)
    }
}
