//! Category entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::reference::Named;
use storefront_core::types::{DbId, Timestamp};

/// A category row from the `categories` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Asset-store handle needed to delete `image`.
    pub image_public_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Named for Category {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// DTO for inserting a category. Slug and image are resolved by the caller.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_public_id: Option<String>,
}
