//! Item domain types.

use chrono::{DateTime, Utc};

use larkspur_core::{ItemId, Price, UserId};

/// A product listing.
#[derive(Debug, Clone)]
pub struct Item {
    /// Unique item ID.
    pub id: ItemId,
    /// User who created the item.
    pub user_id: UserId,
    /// Item name, unique across the catalog.
    pub name: String,
    /// Item price.
    pub price: Price,
    /// Rich-text description (stored as HTML).
    pub body: String,
    /// Image path relative to the static root (e.g. `assets/uploads/mug.png`).
    pub image_path: Option<String>,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
}
