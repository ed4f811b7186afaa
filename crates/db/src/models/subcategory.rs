//! Subcategory entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::reference::Named;
use storefront_core::types::{DbId, Timestamp};

/// A subcategory row from the `subcategories` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_public_id: Option<String>,
    pub category_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Named for Subcategory {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// DTO for inserting a subcategory.
#[derive(Debug, Clone)]
pub struct NewSubcategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_public_id: Option<String>,
    pub category_id: DbId,
}
