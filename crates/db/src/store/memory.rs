//! In-memory store used by tests and by `STORE_BACKEND=memory`.
//!
//! Mirrors the Postgres schema's constraints: unique slugs per collection,
//! unique category names and emails, and foreign keys that reject dangling
//! references, or a subcategory from another category, with `Conflict`.
//! Every method takes the single state lock once, so guarded deletes check
//! and remove under the same write guard.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use storefront_core::error::{CoreError, CoreResult};
use storefront_core::slug::SlugCollection;
use storefront_core::status::{ContactStatus, SubscriptionStatus};
use storefront_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::admin_user::{AdminUser, NewAdminUser};
use crate::models::category::{Category, NewCategory};
use crate::models::contact::{ContactSubmission, NewContactSubmission};
use crate::models::dashboard::{CatalogCounts, InboxCounts};
use crate::models::newsletter::{NewSubscription, NewsletterSubscription};
use crate::models::product::{NewProduct, Product, ProductFilter};
use crate::models::subcategory::{NewSubcategory, Subcategory};
use crate::store::{CatalogStore, DeleteOutcome, Dependents, InboxStore, UserStore};

#[derive(Default)]
struct State {
    next_id: DbId,
    categories: BTreeMap<DbId, Category>,
    subcategories: BTreeMap<DbId, Subcategory>,
    products: BTreeMap<DbId, Product>,
    contacts: BTreeMap<DbId, ContactSubmission>,
    subscriptions: BTreeMap<DbId, NewsletterSubscription>,
    users: BTreeMap<DbId, AdminUser>,
}

impl State {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn slug_in_use(&self, collection: SlugCollection, slug: &str, exclude: Option<DbId>) -> bool {
        let other = |id: DbId| Some(id) != exclude;
        match collection {
            SlugCollection::Categories => self
                .categories
                .values()
                .any(|c| c.slug == slug && other(c.id)),
            SlugCollection::Subcategories => self
                .subcategories
                .values()
                .any(|s| s.slug == slug && other(s.id)),
            SlugCollection::Products => self
                .products
                .values()
                .any(|p| p.slug == slug && other(p.id)),
        }
    }

    fn ensure_slug_free(
        &self,
        collection: SlugCollection,
        slug: &str,
        exclude: Option<DbId>,
    ) -> CoreResult<()> {
        if self.slug_in_use(collection, slug, exclude) {
            return Err(unique_violation(&format!("uq_{}_slug", collection.table())));
        }
        Ok(())
    }

    fn ensure_category_exists(&self, id: DbId) -> CoreResult<()> {
        if !self.categories.contains_key(&id) {
            return Err(fk_violation("fk_category_id"));
        }
        Ok(())
    }

    fn ensure_product_refs(&self, category_id: DbId, subcategory_id: Option<DbId>) -> CoreResult<()> {
        self.ensure_category_exists(category_id)?;
        if let Some(sub_id) = subcategory_id {
            match self.subcategories.get(&sub_id) {
                None => return Err(fk_violation("fk_products_subcategory")),
                Some(sub) if sub.category_id != category_id => {
                    return Err(fk_violation("fk_products_subcategory_category"));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn category_dependents(&self, id: DbId) -> Dependents {
        Dependents {
            subcategories: self
                .subcategories
                .values()
                .filter(|s| s.category_id == id)
                .count() as i64,
            products: self
                .products
                .values()
                .filter(|p| p.category_id == id && p.subcategory_id.is_none())
                .count() as i64,
        }
    }
}

fn unique_violation(constraint: &str) -> CoreError {
    CoreError::Conflict(format!(
        "Duplicate value violates unique constraint: {constraint}"
    ))
}

fn fk_violation(constraint: &str) -> CoreError {
    CoreError::Conflict(format!(
        "Referenced record changed concurrently: {constraint}"
    ))
}

/// Process-local store behind a single `RwLock`.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut rows: Vec<Category> = state.categories.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn find_category(&self, id: DbId) -> CoreResult<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn find_category_by_slug(&self, slug: &str) -> CoreResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn category_name_taken(&self, name: &str, exclude: Option<DbId>) -> CoreResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .values()
            .any(|c| c.name == name && Some(c.id) != exclude))
    }

    async fn insert_category(&self, input: &NewCategory) -> CoreResult<Category> {
        let mut state = self.state.write().await;
        state.ensure_slug_free(SlugCollection::Categories, &input.slug, None)?;
        if state.categories.values().any(|c| c.name == input.name) {
            return Err(unique_violation("uq_categories_name"));
        }
        let now = Utc::now();
        let row = Category {
            id: state.allocate_id(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            description: input.description.clone(),
            image: input.image.clone(),
            image_public_id: input.image_public_id.clone(),
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(row.id, row.clone());
        Ok(row)
    }

    async fn save_category(&self, category: &Category) -> CoreResult<Option<Category>> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&category.id) {
            return Ok(None);
        }
        state.ensure_slug_free(SlugCollection::Categories, &category.slug, Some(category.id))?;
        if state
            .categories
            .values()
            .any(|c| c.name == category.name && c.id != category.id)
        {
            return Err(unique_violation("uq_categories_name"));
        }
        let mut row = category.clone();
        row.updated_at = Utc::now();
        state.categories.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn delete_category(&self, id: DbId) -> CoreResult<Category> {
        let mut state = self.state.write().await;
        let deps = state.category_dependents(id);
        let outcome = if !state.categories.contains_key(&id) {
            DeleteOutcome::NotFound
        } else if !deps.is_empty() {
            DeleteOutcome::Blocked(deps)
        } else {
            match state.categories.remove(&id) {
                Some(row) => DeleteOutcome::Deleted(row),
                None => DeleteOutcome::NotFound,
            }
        };
        outcome.into_result("Category", id)
    }

    async fn list_subcategories(&self, category_id: Option<DbId>) -> CoreResult<Vec<Subcategory>> {
        let state = self.state.read().await;
        let mut rows: Vec<Subcategory> = state
            .subcategories
            .values()
            .filter(|s| category_id.map_or(true, |id| s.category_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn find_subcategory(&self, id: DbId) -> CoreResult<Option<Subcategory>> {
        Ok(self.state.read().await.subcategories.get(&id).cloned())
    }

    async fn find_subcategory_by_slug(&self, slug: &str) -> CoreResult<Option<Subcategory>> {
        let state = self.state.read().await;
        Ok(state.subcategories.values().find(|s| s.slug == slug).cloned())
    }

    async fn insert_subcategory(&self, input: &NewSubcategory) -> CoreResult<Subcategory> {
        let mut state = self.state.write().await;
        state.ensure_slug_free(SlugCollection::Subcategories, &input.slug, None)?;
        state.ensure_category_exists(input.category_id)?;
        let now = Utc::now();
        let row = Subcategory {
            id: state.allocate_id(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            description: input.description.clone(),
            image: input.image.clone(),
            image_public_id: input.image_public_id.clone(),
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        };
        state.subcategories.insert(row.id, row.clone());
        Ok(row)
    }

    async fn save_subcategory(&self, subcategory: &Subcategory) -> CoreResult<Option<Subcategory>> {
        let mut state = self.state.write().await;
        if !state.subcategories.contains_key(&subcategory.id) {
            return Ok(None);
        }
        state.ensure_slug_free(
            SlugCollection::Subcategories,
            &subcategory.slug,
            Some(subcategory.id),
        )?;
        state.ensure_category_exists(subcategory.category_id)?;

        let now = Utc::now();
        let mut row = subcategory.clone();
        row.updated_at = now;
        state.subcategories.insert(row.id, row.clone());

        let mut moved = 0usize;
        for product in state.products.values_mut() {
            if product.subcategory_id == Some(row.id) && product.category_id != row.category_id {
                product.category_id = row.category_id;
                product.updated_at = now;
                moved += 1;
            }
        }
        if moved > 0 {
            tracing::info!(
                subcategory_id = row.id,
                category_id = row.category_id,
                products = moved,
                "Moved products with re-parented subcategory"
            );
        }
        Ok(Some(row))
    }

    async fn delete_subcategory(&self, id: DbId) -> CoreResult<Subcategory> {
        let mut state = self.state.write().await;
        let products = state
            .products
            .values()
            .filter(|p| p.subcategory_id == Some(id))
            .count() as i64;
        let outcome = match state.subcategories.get(&id) {
            None => DeleteOutcome::NotFound,
            Some(_) if products > 0 => DeleteOutcome::Blocked(Dependents {
                subcategories: 0,
                products,
            }),
            Some(_) => match state.subcategories.remove(&id) {
                Some(row) => DeleteOutcome::Deleted(row),
                None => DeleteOutcome::NotFound,
            },
        };
        outcome.into_result("Subcategory", id)
    }

    async fn list_products(&self, filter: &ProductFilter) -> CoreResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut rows: Vec<Product> = state
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn find_product(&self, id: DbId) -> CoreResult<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn find_product_by_slug(&self, slug: &str) -> CoreResult<Option<Product>> {
        let state = self.state.read().await;
        Ok(state.products.values().find(|p| p.slug == slug).cloned())
    }

    async fn insert_product(&self, input: &NewProduct) -> CoreResult<Product> {
        let mut state = self.state.write().await;
        state.ensure_slug_free(SlugCollection::Products, &input.slug, None)?;
        state.ensure_product_refs(input.category_id, input.subcategory_id)?;
        let now = Utc::now();
        let row = Product {
            id: state.allocate_id(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            short_description: input.short_description.clone(),
            description: input.description.clone(),
            price: input.price,
            main_image: input.main_image.clone(),
            main_image_public_id: input.main_image_public_id.clone(),
            images: input.images.clone(),
            image_public_ids: input.image_public_ids.clone(),
            category_id: input.category_id,
            subcategory_id: input.subcategory_id,
            features: input.features.clone(),
            in_stock: input.in_stock,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn save_product(&self, product: &Product) -> CoreResult<Option<Product>> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&product.id) {
            return Ok(None);
        }
        state.ensure_slug_free(SlugCollection::Products, &product.slug, Some(product.id))?;
        state.ensure_product_refs(product.category_id, product.subcategory_id)?;
        let mut row = product.clone();
        row.updated_at = Utc::now();
        state.products.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn delete_product(&self, id: DbId) -> CoreResult<Option<Product>> {
        Ok(self.state.write().await.products.remove(&id))
    }

    async fn slug_taken(
        &self,
        collection: SlugCollection,
        slug: &str,
        exclude: Option<DbId>,
    ) -> CoreResult<bool> {
        Ok(self.state.read().await.slug_in_use(collection, slug, exclude))
    }

    async fn catalog_counts(&self) -> CoreResult<CatalogCounts> {
        let state = self.state.read().await;
        Ok(CatalogCounts {
            categories: state.categories.len() as i64,
            subcategories: state.subcategories.len() as i64,
            products: state.products.len() as i64,
            products_in_stock: state.products.values().filter(|p| p.in_stock).count() as i64,
        })
    }
}

#[async_trait]
impl InboxStore for MemoryStore {
    async fn insert_contact(&self, input: &NewContactSubmission) -> CoreResult<ContactSubmission> {
        let mut state = self.state.write().await;
        if state.contacts.values().any(|c| c.slug == input.slug) {
            return Err(unique_violation("uq_contact_submissions_slug"));
        }
        let now = Utc::now();
        let row = ContactSubmission {
            id: state.allocate_id(),
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            company: input.company.clone(),
            subject: input.subject.clone(),
            message: input.message.clone(),
            status: ContactStatus::New,
            slug: input.slug.clone(),
            created_at: now,
            updated_at: now,
        };
        state.contacts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_contacts(
        &self,
        status: Option<ContactStatus>,
    ) -> CoreResult<Vec<ContactSubmission>> {
        let state = self.state.read().await;
        let mut rows: Vec<ContactSubmission> = state
            .contacts
            .values()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_contact_by_slug(&self, slug: &str) -> CoreResult<Option<ContactSubmission>> {
        let state = self.state.read().await;
        Ok(state.contacts.values().find(|c| c.slug == slug).cloned())
    }

    async fn set_contact_status(
        &self,
        id: DbId,
        status: ContactStatus,
    ) -> CoreResult<Option<ContactSubmission>> {
        let mut state = self.state.write().await;
        Ok(state.contacts.get_mut(&id).map(|row| {
            row.status = status;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn delete_contact(&self, id: DbId) -> CoreResult<bool> {
        Ok(self.state.write().await.contacts.remove(&id).is_some())
    }

    async fn find_subscription_by_email(
        &self,
        email: &str,
    ) -> CoreResult<Option<NewsletterSubscription>> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .values()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn find_subscription_by_slug(
        &self,
        slug: &str,
    ) -> CoreResult<Option<NewsletterSubscription>> {
        let state = self.state.read().await;
        Ok(state.subscriptions.values().find(|s| s.slug == slug).cloned())
    }

    async fn insert_subscription(
        &self,
        input: &NewSubscription,
    ) -> CoreResult<NewsletterSubscription> {
        let mut state = self.state.write().await;
        if state.subscriptions.values().any(|s| s.email == input.email) {
            return Err(unique_violation("uq_newsletter_subscriptions_email"));
        }
        if state.subscriptions.values().any(|s| s.slug == input.slug) {
            return Err(unique_violation("uq_newsletter_subscriptions_slug"));
        }
        let now = Utc::now();
        let row = NewsletterSubscription {
            id: state.allocate_id(),
            email: input.email.clone(),
            status: SubscriptionStatus::Active,
            slug: input.slug.clone(),
            subscribed_at: now,
            unsubscribed_at: None,
            created_at: now,
            updated_at: now,
        };
        state.subscriptions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn save_subscription(
        &self,
        subscription: &NewsletterSubscription,
    ) -> CoreResult<Option<NewsletterSubscription>> {
        let mut state = self.state.write().await;
        Ok(state.subscriptions.get_mut(&subscription.id).map(|row| {
            row.status = subscription.status;
            row.subscribed_at = subscription.subscribed_at;
            row.unsubscribed_at = subscription.unsubscribed_at;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn list_subscriptions(
        &self,
        status: Option<SubscriptionStatus>,
    ) -> CoreResult<Vec<NewsletterSubscription>> {
        let state = self.state.read().await;
        let mut rows: Vec<NewsletterSubscription> = state
            .subscriptions
            .values()
            .filter(|s| status.map_or(true, |st| s.status == st))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.subscribed_at
                .cmp(&a.subscribed_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(rows)
    }

    async fn delete_subscription(&self, id: DbId) -> CoreResult<bool> {
        Ok(self.state.write().await.subscriptions.remove(&id).is_some())
    }

    async fn inbox_counts(&self) -> CoreResult<InboxCounts> {
        let state = self.state.read().await;
        Ok(InboxCounts {
            contacts: state.contacts.len() as i64,
            contacts_new: state
                .contacts
                .values()
                .filter(|c| c.status == ContactStatus::New)
                .count() as i64,
            subscribers: state.subscriptions.len() as i64,
            subscribers_active: state
                .subscriptions
                .values()
                .filter(|s| s.status == SubscriptionStatus::Active)
                .count() as i64,
        })
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<AdminUser>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: DbId) -> CoreResult<Option<AdminUser>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, input: &NewAdminUser) -> CoreResult<AdminUser> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == input.email) {
            return Err(unique_violation("uq_admin_users_email"));
        }
        let now = Utc::now();
        let row = AdminUser {
            id: state.allocate_id(),
            email: input.email.clone(),
            name: input.name.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role.clone(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn count_users(&self) -> CoreResult<i64> {
        Ok(self.state.read().await.users.len() as i64)
    }
}
