//! Persistence seams used by the catalog and inbox services.
//!
//! Three object-safe traits, each with a Postgres implementation
//! ([`postgres::PgStore`]) and an in-memory one ([`memory::MemoryStore`]).
//! A single store value usually implements all three; the application holds
//! them as `Arc<dyn ...>` so handlers never see the backend.
//!
//! All methods return [`CoreResult`]; backend errors are classified into
//! `Conflict` (constraint violations) or `Internal` before they leave the
//! implementation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use storefront_core::error::{CoreError, CoreResult};
use storefront_core::slug::SlugCollection;
use storefront_core::status::{ContactStatus, SubscriptionStatus};
use storefront_core::types::DbId;

use crate::models::admin_user::{AdminUser, NewAdminUser};
use crate::models::category::{Category, NewCategory};
use crate::models::contact::{ContactSubmission, NewContactSubmission};
use crate::models::dashboard::{CatalogCounts, InboxCounts};
use crate::models::newsletter::{NewSubscription, NewsletterSubscription};
use crate::models::product::{NewProduct, Product, ProductFilter};
use crate::models::subcategory::{NewSubcategory, Subcategory};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Dependents that block deleting a parent entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dependents {
    pub subcategories: i64,
    pub products: i64,
}

impl Dependents {
    pub fn is_empty(&self) -> bool {
        self.subcategories == 0 && self.products == 0
    }
}

/// Result of a guarded delete, before it is turned into a [`CoreResult`].
#[derive(Debug)]
pub enum DeleteOutcome<T> {
    Deleted(T),
    NotFound,
    Blocked(Dependents),
}

impl<T> DeleteOutcome<T> {
    /// `Deleted` -> `Ok`, `NotFound` -> `CoreError::NotFound`,
    /// `Blocked` -> `CoreError::Conflict` naming the dependents.
    pub fn into_result(self, entity: &'static str, id: DbId) -> CoreResult<T> {
        match self {
            Self::Deleted(row) => Ok(row),
            Self::NotFound => Err(CoreError::NotFound { entity, id }),
            Self::Blocked(deps) => {
                let mut parts = Vec::new();
                if deps.subcategories > 0 {
                    parts.push(format!("{} subcategories", deps.subcategories));
                }
                if deps.products > 0 {
                    parts.push(format!("{} products", deps.products));
                }
                Err(CoreError::Conflict(format!(
                    "Cannot delete {} {id}: it has dependents ({})",
                    entity.to_lowercase(),
                    parts.join(", ")
                )))
            }
        }
    }
}

/// Category / Subcategory / Product persistence.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // --- Categories ---
    async fn list_categories(&self) -> CoreResult<Vec<Category>>;
    async fn find_category(&self, id: DbId) -> CoreResult<Option<Category>>;
    async fn find_category_by_slug(&self, slug: &str) -> CoreResult<Option<Category>>;
    async fn category_name_taken(&self, name: &str, exclude: Option<DbId>) -> CoreResult<bool>;
    async fn insert_category(&self, input: &NewCategory) -> CoreResult<Category>;
    /// Write every mutable column of `category`. `None` if the row is gone.
    async fn save_category(&self, category: &Category) -> CoreResult<Option<Category>>;
    /// Remove a category that has no subcategories and no products without a
    /// subcategory. The check and the removal are atomic.
    async fn delete_category(&self, id: DbId) -> CoreResult<Category>;

    // --- Subcategories ---
    async fn list_subcategories(&self, category_id: Option<DbId>) -> CoreResult<Vec<Subcategory>>;
    async fn find_subcategory(&self, id: DbId) -> CoreResult<Option<Subcategory>>;
    async fn find_subcategory_by_slug(&self, slug: &str) -> CoreResult<Option<Subcategory>>;
    async fn insert_subcategory(&self, input: &NewSubcategory) -> CoreResult<Subcategory>;
    /// Write every mutable column of `subcategory`. When its `category_id`
    /// changed, its products move to the new category in the same write.
    async fn save_subcategory(&self, subcategory: &Subcategory) -> CoreResult<Option<Subcategory>>;
    /// Remove a subcategory that has no products. Atomic like
    /// [`CatalogStore::delete_category`].
    async fn delete_subcategory(&self, id: DbId) -> CoreResult<Subcategory>;

    // --- Products ---
    async fn list_products(&self, filter: &ProductFilter) -> CoreResult<Vec<Product>>;
    async fn find_product(&self, id: DbId) -> CoreResult<Option<Product>>;
    async fn find_product_by_slug(&self, slug: &str) -> CoreResult<Option<Product>>;
    async fn insert_product(&self, input: &NewProduct) -> CoreResult<Product>;
    async fn save_product(&self, product: &Product) -> CoreResult<Option<Product>>;
    async fn delete_product(&self, id: DbId) -> CoreResult<Option<Product>>;

    // --- Shared ---
    /// Whether `slug` is used by a record of `collection` other than `exclude`.
    async fn slug_taken(
        &self,
        collection: SlugCollection,
        slug: &str,
        exclude: Option<DbId>,
    ) -> CoreResult<bool>;
    async fn catalog_counts(&self) -> CoreResult<CatalogCounts>;
}

/// Contact submission and newsletter subscription persistence.
#[async_trait]
pub trait InboxStore: Send + Sync {
    // --- Contact submissions ---
    async fn insert_contact(&self, input: &NewContactSubmission) -> CoreResult<ContactSubmission>;
    async fn list_contacts(&self, status: Option<ContactStatus>)
        -> CoreResult<Vec<ContactSubmission>>;
    async fn find_contact_by_slug(&self, slug: &str) -> CoreResult<Option<ContactSubmission>>;
    async fn set_contact_status(
        &self,
        id: DbId,
        status: ContactStatus,
    ) -> CoreResult<Option<ContactSubmission>>;
    async fn delete_contact(&self, id: DbId) -> CoreResult<bool>;

    // --- Newsletter ---
    async fn find_subscription_by_email(
        &self,
        email: &str,
    ) -> CoreResult<Option<NewsletterSubscription>>;
    async fn find_subscription_by_slug(
        &self,
        slug: &str,
    ) -> CoreResult<Option<NewsletterSubscription>>;
    async fn insert_subscription(&self, input: &NewSubscription)
        -> CoreResult<NewsletterSubscription>;
    /// Write status, `subscribed_at` and `unsubscribed_at`.
    async fn save_subscription(
        &self,
        subscription: &NewsletterSubscription,
    ) -> CoreResult<Option<NewsletterSubscription>>;
    async fn list_subscriptions(
        &self,
        status: Option<SubscriptionStatus>,
    ) -> CoreResult<Vec<NewsletterSubscription>>;
    async fn delete_subscription(&self, id: DbId) -> CoreResult<bool>;

    async fn inbox_counts(&self) -> CoreResult<InboxCounts>;
}

/// Back-office user persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<AdminUser>>;
    async fn find_user(&self, id: DbId) -> CoreResult<Option<AdminUser>>;
    async fn insert_user(&self, input: &NewAdminUser) -> CoreResult<AdminUser>;
    async fn count_users(&self) -> CoreResult<i64>;
}
