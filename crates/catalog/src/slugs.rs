//! Slug assignment against the store.

use std::sync::Arc;

use chrono::Utc;
use storefront_core::error::{CoreError, CoreResult};
use storefront_core::slug::{resolve_slug, synthetic_slug, SlugCollection};
use storefront_core::types::DbId;
use storefront_db::store::CatalogStore;

/// Picks catalog slugs and checks them for uniqueness within their collection.
#[derive(Clone)]
pub struct SlugAssigner {
    store: Arc<dyn CatalogStore>,
}

impl SlugAssigner {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Fail with `Conflict` when `slug` is used by another record of `collection`.
    pub async fn assert_unique(
        &self,
        collection: SlugCollection,
        slug: &str,
        exclude: Option<DbId>,
    ) -> CoreResult<()> {
        if self.store.slug_taken(collection, slug, exclude).await? {
            return Err(CoreError::Conflict(format!(
                "{} slug '{slug}' is already in use",
                collection.entity()
            )));
        }
        Ok(())
    }

    /// Normalize `explicit` (or derive from `name`) and check it is free.
    pub async fn assign(
        &self,
        collection: SlugCollection,
        name: &str,
        explicit: Option<&str>,
        exclude: Option<DbId>,
    ) -> CoreResult<String> {
        let slug = resolve_slug(name, explicit)?;
        self.assert_unique(collection, &slug, exclude).await?;
        Ok(slug)
    }
}

/// Synthetic slug for inbox records, stamped with the current time.
pub fn synthetic(seed: &str) -> String {
    let entropy = uuid::Uuid::new_v4().as_u128() as u32;
    synthetic_slug(seed, Utc::now(), entropy)
}
