//! Postgres-backed store: thin delegation to the repositories plus
//! classification of sqlx errors into [`CoreError`].

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
use crate::repositories::{
    AdminUserRepo, CategoryRepo, ContactRepo, DashboardRepo, NewsletterRepo, ProductRepo,
    SubcategoryRepo,
};
use crate::store::{CatalogStore, InboxStore, UserStore};
use crate::DbPool;

/// Store over a shared connection pool. Cloning is cheap.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a sqlx error onto the domain taxonomy.
///
/// - Unique violations (`23505`) become `Conflict`, naming the constraint.
/// - Foreign-key violations (`23503`) become `Conflict`: a referenced parent
///   vanished, or a parent still has children.
/// - Everything else is logged and becomes a sanitised `Internal`.
pub fn db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some("23505") => {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            Some("23503") => {
                return CoreError::Conflict(format!(
                    "Referenced record changed concurrently: {constraint}"
                ));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal("Database error".to_string())
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        CategoryRepo::list(&self.pool).await.map_err(db_error)
    }

    async fn find_category(&self, id: DbId) -> CoreResult<Option<Category>> {
        CategoryRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)
    }

    async fn find_category_by_slug(&self, slug: &str) -> CoreResult<Option<Category>> {
        CategoryRepo::find_by_slug(&self.pool, slug)
            .await
            .map_err(db_error)
    }

    async fn category_name_taken(&self, name: &str, exclude: Option<DbId>) -> CoreResult<bool> {
        CategoryRepo::name_exists(&self.pool, name, exclude)
            .await
            .map_err(db_error)
    }

    async fn insert_category(&self, input: &NewCategory) -> CoreResult<Category> {
        CategoryRepo::create(&self.pool, input)
            .await
            .map_err(db_error)
    }

    async fn save_category(&self, category: &Category) -> CoreResult<Option<Category>> {
        CategoryRepo::save(&self.pool, category)
            .await
            .map_err(db_error)
    }

    async fn delete_category(&self, id: DbId) -> CoreResult<Category> {
        CategoryRepo::delete_unreferenced(&self.pool, id)
            .await
            .map_err(db_error)?
            .into_result("Category", id)
    }

    async fn list_subcategories(&self, category_id: Option<DbId>) -> CoreResult<Vec<Subcategory>> {
        SubcategoryRepo::list(&self.pool, category_id)
            .await
            .map_err(db_error)
    }

    async fn find_subcategory(&self, id: DbId) -> CoreResult<Option<Subcategory>> {
        SubcategoryRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)
    }

    async fn find_subcategory_by_slug(&self, slug: &str) -> CoreResult<Option<Subcategory>> {
        SubcategoryRepo::find_by_slug(&self.pool, slug)
            .await
            .map_err(db_error)
    }

    async fn insert_subcategory(&self, input: &NewSubcategory) -> CoreResult<Subcategory> {
        SubcategoryRepo::create(&self.pool, input)
            .await
            .map_err(db_error)
    }

    async fn save_subcategory(&self, subcategory: &Subcategory) -> CoreResult<Option<Subcategory>> {
        SubcategoryRepo::save(&self.pool, subcategory)
            .await
            .map_err(db_error)
    }

    async fn delete_subcategory(&self, id: DbId) -> CoreResult<Subcategory> {
        SubcategoryRepo::delete_unreferenced(&self.pool, id)
            .await
            .map_err(db_error)?
            .into_result("Subcategory", id)
    }

    async fn list_products(&self, filter: &ProductFilter) -> CoreResult<Vec<Product>> {
        ProductRepo::list(&self.pool, filter)
            .await
            .map_err(db_error)
    }

    async fn find_product(&self, id: DbId) -> CoreResult<Option<Product>> {
        ProductRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)
    }

    async fn find_product_by_slug(&self, slug: &str) -> CoreResult<Option<Product>> {
        ProductRepo::find_by_slug(&self.pool, slug)
            .await
            .map_err(db_error)
    }

    async fn insert_product(&self, input: &NewProduct) -> CoreResult<Product> {
        ProductRepo::create(&self.pool, input)
            .await
            .map_err(db_error)
    }

    async fn save_product(&self, product: &Product) -> CoreResult<Option<Product>> {
        ProductRepo::save(&self.pool, product)
            .await
            .map_err(db_error)
    }

    async fn delete_product(&self, id: DbId) -> CoreResult<Option<Product>> {
        ProductRepo::delete(&self.pool, id).await.map_err(db_error)
    }

    async fn slug_taken(
        &self,
        collection: SlugCollection,
        slug: &str,
        exclude: Option<DbId>,
    ) -> CoreResult<bool> {
        let taken = match collection {
            SlugCollection::Categories => CategoryRepo::slug_exists(&self.pool, slug, exclude).await,
            SlugCollection::Subcategories => {
                SubcategoryRepo::slug_exists(&self.pool, slug, exclude).await
            }
            SlugCollection::Products => ProductRepo::slug_exists(&self.pool, slug, exclude).await,
        };
        taken.map_err(db_error)
    }

    async fn catalog_counts(&self) -> CoreResult<CatalogCounts> {
        DashboardRepo::catalog_counts(&self.pool)
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl InboxStore for PgStore {
    async fn insert_contact(&self, input: &NewContactSubmission) -> CoreResult<ContactSubmission> {
        ContactRepo::create(&self.pool, input)
            .await
            .map_err(db_error)
    }

    async fn list_contacts(
        &self,
        status: Option<ContactStatus>,
    ) -> CoreResult<Vec<ContactSubmission>> {
        ContactRepo::list(&self.pool, status)
            .await
            .map_err(db_error)
    }

    async fn find_contact_by_slug(&self, slug: &str) -> CoreResult<Option<ContactSubmission>> {
        ContactRepo::find_by_slug(&self.pool, slug)
            .await
            .map_err(db_error)
    }

    async fn set_contact_status(
        &self,
        id: DbId,
        status: ContactStatus,
    ) -> CoreResult<Option<ContactSubmission>> {
        ContactRepo::set_status(&self.pool, id, status)
            .await
            .map_err(db_error)
    }

    async fn delete_contact(&self, id: DbId) -> CoreResult<bool> {
        ContactRepo::delete(&self.pool, id).await.map_err(db_error)
    }

    async fn find_subscription_by_email(
        &self,
        email: &str,
    ) -> CoreResult<Option<NewsletterSubscription>> {
        NewsletterRepo::find_by_email(&self.pool, email)
            .await
            .map_err(db_error)
    }

    async fn find_subscription_by_slug(
        &self,
        slug: &str,
    ) -> CoreResult<Option<NewsletterSubscription>> {
        NewsletterRepo::find_by_slug(&self.pool, slug)
            .await
            .map_err(db_error)
    }

    async fn insert_subscription(
        &self,
        input: &NewSubscription,
    ) -> CoreResult<NewsletterSubscription> {
        NewsletterRepo::create(&self.pool, input)
            .await
            .map_err(db_error)
    }

    async fn save_subscription(
        &self,
        subscription: &NewsletterSubscription,
    ) -> CoreResult<Option<NewsletterSubscription>> {
        NewsletterRepo::save(&self.pool, subscription)
            .await
            .map_err(db_error)
    }

    async fn list_subscriptions(
        &self,
        status: Option<SubscriptionStatus>,
    ) -> CoreResult<Vec<NewsletterSubscription>> {
        NewsletterRepo::list(&self.pool, status)
            .await
            .map_err(db_error)
    }

    async fn delete_subscription(&self, id: DbId) -> CoreResult<bool> {
        NewsletterRepo::delete(&self.pool, id)
            .await
            .map_err(db_error)
    }

    async fn inbox_counts(&self) -> CoreResult<InboxCounts> {
        DashboardRepo::inbox_counts(&self.pool)
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<AdminUser>> {
        AdminUserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(db_error)
    }

    async fn find_user(&self, id: DbId) -> CoreResult<Option<AdminUser>> {
        AdminUserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)
    }

    async fn insert_user(&self, input: &NewAdminUser) -> CoreResult<AdminUser> {
        AdminUserRepo::create(&self.pool, input)
            .await
            .map_err(db_error)
    }

    async fn count_users(&self) -> CoreResult<i64> {
        AdminUserRepo::count(&self.pool).await.map_err(db_error)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn non_database_errors_become_internal() {
        assert_matches!(db_error(sqlx::Error::RowNotFound), CoreError::Internal(_));
        assert_matches!(db_error(sqlx::Error::PoolTimedOut), CoreError::Internal(_));
    }
}
