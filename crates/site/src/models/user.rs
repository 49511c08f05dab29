//! User domain types.

use chrono::{DateTime, Utc};

use larkspur_core::{Email, UserId};

/// A registered account.
///
/// The password hash is deliberately not part of this type; repositories
/// return it separately when credential verification needs it.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name shown next to comments.
    pub name: String,
    /// Whether this user may create and delete items.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
