//! Comment domain types.

use chrono::{DateTime, Utc};

use larkspur_core::{CommentId, Email, ItemId, UserId};

/// A comment attached to one item.
#[derive(Debug, Clone)]
pub struct Comment {
    /// Unique comment ID.
    pub id: CommentId,
    /// Rich-text comment body (stored as HTML).
    pub body: String,
    /// Author of the comment.
    pub user_id: UserId,
    /// Item the comment is attached to.
    pub item_id: ItemId,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

/// A comment joined with its author, ready for rendering.
#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    /// Unique comment ID.
    pub id: CommentId,
    /// Rich-text comment body (stored as HTML).
    pub body: String,
    /// Author's display name.
    pub author_name: String,
    /// Author's email, used to resolve the avatar.
    pub author_email: Email,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}
