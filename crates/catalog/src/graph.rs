//! Category -> Subcategory -> Product writes with referential integrity.

use std::sync::Arc;

use storefront_assets::{AssetRef, Upload};
use storefront_core::error::{CoreError, CoreResult};
use storefront_core::image::{
    plan_main_image_update, removal_order, ImageAction, FOLDER_CATEGORIES, FOLDER_PRODUCTS,
    FOLDER_SUBCATEGORIES,
};
use storefront_core::slug::SlugCollection;
use storefront_core::types::DbId;
use storefront_core::validation::{optional_text, require_name, validate_price};
use storefront_db::models::category::{Category, NewCategory};
use storefront_db::models::product::{NewProduct, Product};
use storefront_db::models::subcategory::{NewSubcategory, Subcategory};
use storefront_db::store::CatalogStore;

use crate::attachment::{ImageAttachment, ImageChange};
use crate::slugs::SlugAssigner;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<Upload>,
}

/// Partial update. `None` leaves a field unchanged; a blank description
/// clears it.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<Upload>,
    pub keep_current_image: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SubcategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: DbId,
    pub image: Option<Upload>,
}

#[derive(Debug, Clone, Default)]
pub struct SubcategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub image: Option<Upload>,
    pub keep_current_image: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: String,
    pub slug: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: DbId,
    pub subcategory_id: Option<DbId>,
    pub features: Vec<String>,
    /// Defaults to `true`.
    pub in_stock: Option<bool>,
    pub main_image: Option<Upload>,
    pub images: Vec<Upload>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<DbId>,
    /// `Some(None)` detaches the product from its subcategory.
    pub subcategory_id: Option<Option<DbId>>,
    pub features: Option<Vec<String>>,
    pub in_stock: Option<bool>,
    pub main_image: Option<Upload>,
    pub keep_current_main_image: bool,
    /// Appended to the gallery.
    pub images: Vec<Upload>,
    /// Gallery positions to remove, relative to the gallery before this update.
    pub remove_image_indices: Vec<usize>,
}

/// On create, a taken name or slug is a validation failure of the input.
fn duplicate_on_create(err: CoreError) -> CoreError {
    match err {
        CoreError::Conflict(msg) => CoreError::Validation(msg),
        other => other,
    }
}

fn clean_features(features: Vec<String>) -> Vec<String> {
    features
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CatalogGraph {
    store: Arc<dyn CatalogStore>,
    slugs: SlugAssigner,
    images: ImageAttachment,
}

impl CatalogGraph {
    pub fn new(store: Arc<dyn CatalogStore>, images: ImageAttachment) -> Self {
        Self {
            slugs: SlugAssigner::new(store.clone()),
            store,
            images,
        }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    pub fn images(&self) -> &ImageAttachment {
        &self.images
    }

    pub(crate) async fn category(&self, id: DbId) -> CoreResult<Category> {
        self.store
            .find_category(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Category",
                id,
            })
    }

    pub(crate) async fn subcategory(&self, id: DbId) -> CoreResult<Subcategory> {
        self.store
            .find_subcategory(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Subcategory",
                id,
            })
    }

    pub(crate) async fn product(&self, id: DbId) -> CoreResult<Product> {
        self.store
            .find_product(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Product",
                id,
            })
    }

    /// A product's category must exist, and its subcategory (if any) must
    /// exist and belong to that category.
    async fn check_product_placement(
        &self,
        category_id: DbId,
        subcategory_id: Option<DbId>,
    ) -> CoreResult<()> {
        self.category(category_id).await?;
        if let Some(sub_id) = subcategory_id {
            let sub = self.subcategory(sub_id).await?;
            if sub.category_id != category_id {
                return Err(CoreError::Validation(format!(
                    "Subcategory {sub_id} does not belong to category {category_id}"
                )));
            }
        }
        Ok(())
    }

    // --- Categories ---

    pub async fn create_category(&self, input: CategoryInput) -> CoreResult<Category> {
        let name = require_name(&input.name)?;
        let slug = self
            .slugs
            .assign(SlugCollection::Categories, &name, input.slug.as_deref(), None)
            .await
            .map_err(duplicate_on_create)?;
        if self.store.category_name_taken(&name, None).await? {
            return Err(CoreError::Validation(format!(
                "Category with name '{name}' already exists"
            )));
        }

        let image = match &input.image {
            Some(file) => Some(self.images.attach(file, FOLDER_CATEGORIES).await?),
            None => None,
        };

        let new = NewCategory {
            name,
            slug,
            description: optional_text(input.description.as_deref()),
            image: image.as_ref().map(|a| a.url.clone()),
            image_public_id: image.as_ref().map(|a| a.public_id.clone()),
        };
        match self.store.insert_category(&new).await {
            Ok(category) => {
                tracing::info!(id = category.id, slug = %category.slug, "Category created");
                Ok(category)
            }
            Err(e) => {
                if let Some(asset) = &image {
                    self.images.release(&asset.public_id).await;
                }
                Err(e)
            }
        }
    }

    pub async fn update_category(&self, id: DbId, patch: CategoryPatch) -> CoreResult<Category> {
        let mut category = self.category(id).await?;

        if let Some(name) = &patch.name {
            let name = require_name(name)?;
            if self.store.category_name_taken(&name, Some(id)).await? {
                return Err(CoreError::Conflict(format!(
                    "Category with name '{name}' already exists"
                )));
            }
            category.name = name;
        }
        if let Some(slug) = &patch.slug {
            category.slug = self
                .slugs
                .assign(SlugCollection::Categories, &category.name, Some(slug), Some(id))
                .await?;
        }
        if let Some(description) = &patch.description {
            category.description = optional_text(Some(description));
        }

        let change = self
            .images
            .update_single(
                category.image.as_deref(),
                category.image_public_id.as_deref(),
                patch.image.as_ref(),
                patch.keep_current_image,
                FOLDER_CATEGORIES,
            )
            .await?;
        change.apply(&mut category.image, &mut category.image_public_id);

        let saved = self.persist(&change, self.store.save_category(&category)).await?;
        let saved = saved.ok_or(CoreError::NotFound {
            entity: "Category",
            id,
        })?;
        tracing::info!(id, action = ?change.action, "Category updated");
        Ok(saved)
    }

    /// Delete a category with no subcategories and no unattached products,
    /// then release its image.
    pub async fn delete_category(&self, id: DbId) -> CoreResult<()> {
        let deleted = self.store.delete_category(id).await?;
        if let Some(handle) = &deleted.image_public_id {
            self.images.release(handle).await;
        }
        tracing::info!(id, slug = %deleted.slug, "Category deleted");
        Ok(())
    }

    // --- Subcategories ---

    pub async fn create_subcategory(&self, input: SubcategoryInput) -> CoreResult<Subcategory> {
        let name = require_name(&input.name)?;
        self.category(input.category_id).await?;
        let slug = self
            .slugs
            .assign(SlugCollection::Subcategories, &name, input.slug.as_deref(), None)
            .await
            .map_err(duplicate_on_create)?;

        let image = match &input.image {
            Some(file) => Some(self.images.attach(file, FOLDER_SUBCATEGORIES).await?),
            None => None,
        };

        let new = NewSubcategory {
            name,
            slug,
            description: optional_text(input.description.as_deref()),
            image: image.as_ref().map(|a| a.url.clone()),
            image_public_id: image.as_ref().map(|a| a.public_id.clone()),
            category_id: input.category_id,
        };
        match self.store.insert_subcategory(&new).await {
            Ok(sub) => {
                tracing::info!(id = sub.id, category_id = sub.category_id, "Subcategory created");
                Ok(sub)
            }
            Err(e) => {
                if let Some(asset) = &image {
                    self.images.release(&asset.public_id).await;
                }
                Err(e)
            }
        }
    }

    /// Update a subcategory. Changing `category_id` re-parents it together
    /// with its products.
    pub async fn update_subcategory(
        &self,
        id: DbId,
        patch: SubcategoryPatch,
    ) -> CoreResult<Subcategory> {
        let mut sub = self.subcategory(id).await?;

        if let Some(name) = &patch.name {
            sub.name = require_name(name)?;
        }
        if let Some(slug) = &patch.slug {
            sub.slug = self
                .slugs
                .assign(SlugCollection::Subcategories, &sub.name, Some(slug), Some(id))
                .await?;
        }
        if let Some(description) = &patch.description {
            sub.description = optional_text(Some(description));
        }
        if let Some(category_id) = patch.category_id {
            self.category(category_id).await?;
            sub.category_id = category_id;
        }

        let change = self
            .images
            .update_single(
                sub.image.as_deref(),
                sub.image_public_id.as_deref(),
                patch.image.as_ref(),
                patch.keep_current_image,
                FOLDER_SUBCATEGORIES,
            )
            .await?;
        change.apply(&mut sub.image, &mut sub.image_public_id);

        let saved = self
            .persist(&change, self.store.save_subcategory(&sub))
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Subcategory",
                id,
            })?;
        tracing::info!(id, category_id = saved.category_id, "Subcategory updated");
        Ok(saved)
    }

    pub async fn delete_subcategory(&self, id: DbId) -> CoreResult<()> {
        let deleted = self.store.delete_subcategory(id).await?;
        if let Some(handle) = &deleted.image_public_id {
            self.images.release(handle).await;
        }
        tracing::info!(id, slug = %deleted.slug, "Subcategory deleted");
        Ok(())
    }

    // --- Products ---

    pub async fn create_product(&self, input: ProductInput) -> CoreResult<Product> {
        let name = require_name(&input.name)?;
        validate_price(input.price)?;
        let main_file = input
            .main_image
            .as_ref()
            .ok_or_else(|| CoreError::Validation("Main image is required".into()))?;
        self.check_product_placement(input.category_id, input.subcategory_id)
            .await?;
        let slug = self
            .slugs
            .assign(SlugCollection::Products, &name, input.slug.as_deref(), None)
            .await
            .map_err(duplicate_on_create)?;

        self.images.validate(main_file)?;
        for file in &input.images {
            self.images.validate(file)?;
        }
        let main = self.images.attach(main_file, FOLDER_PRODUCTS).await?;
        let gallery = match self.images.attach_all(&input.images, FOLDER_PRODUCTS).await {
            Ok(gallery) => gallery,
            Err(e) => {
                self.images.release(&main.public_id).await;
                return Err(e);
            }
        };

        let new = NewProduct {
            name,
            slug,
            short_description: optional_text(input.short_description.as_deref()),
            description: optional_text(input.description.as_deref()),
            price: input.price,
            main_image: main.url.clone(),
            main_image_public_id: Some(main.public_id.clone()),
            images: gallery.iter().map(|a| a.url.clone()).collect(),
            image_public_ids: gallery.iter().map(|a| a.public_id.clone()).collect(),
            category_id: input.category_id,
            subcategory_id: input.subcategory_id,
            features: clean_features(input.features),
            in_stock: input.in_stock.unwrap_or(true),
        };
        match self.store.insert_product(&new).await {
            Ok(product) => {
                tracing::info!(
                    id = product.id,
                    slug = %product.slug,
                    gallery = product.images.len(),
                    "Product created"
                );
                Ok(product)
            }
            Err(e) => {
                self.images.release(&main.public_id).await;
                self.images.release_assets(&gallery).await;
                Err(e)
            }
        }
    }

    pub async fn update_product(&self, id: DbId, patch: ProductPatch) -> CoreResult<Product> {
        let mut product = self.product(id).await?;

        if let Some(name) = &patch.name {
            product.name = require_name(name)?;
        }
        if let Some(slug) = &patch.slug {
            product.slug = self
                .slugs
                .assign(SlugCollection::Products, &product.name, Some(slug), Some(id))
                .await?;
        }
        if let Some(text) = &patch.short_description {
            product.short_description = optional_text(Some(text));
        }
        if let Some(text) = &patch.description {
            product.description = optional_text(Some(text));
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
            product.price = price;
        }
        if let Some(features) = patch.features.clone() {
            product.features = clean_features(features);
        }
        if let Some(in_stock) = patch.in_stock {
            product.in_stock = in_stock;
        }

        if let Some(category_id) = patch.category_id {
            product.category_id = category_id;
        }
        if let Some(subcategory_id) = patch.subcategory_id {
            product.subcategory_id = subcategory_id;
        }
        if patch.category_id.is_some() || patch.subcategory_id.is_some() {
            self.check_product_placement(product.category_id, product.subcategory_id)
                .await?;
        }

        let main_action = plan_main_image_update(
            patch.main_image.is_some(),
            patch.keep_current_main_image,
            !product.main_image.is_empty(),
        )?;
        let removals = removal_order(&patch.remove_image_indices, product.images.len())?;
        if let Some(file) = &patch.main_image {
            self.images.validate(file)?;
        }
        for file in &patch.images {
            self.images.validate(file)?;
        }

        // Uploads: all or nothing.
        let mut uploaded: Vec<AssetRef> = Vec::new();
        let mut stale: Vec<String> = Vec::new();
        if let (ImageAction::Replace, Some(file)) = (main_action, &patch.main_image) {
            let change = self
                .images
                .replace(product.main_image_public_id.as_deref(), file, FOLDER_PRODUCTS)
                .await?;
            if let Some(asset) = change.uploaded {
                product.main_image = asset.url.clone();
                product.main_image_public_id = Some(asset.public_id.clone());
                uploaded.push(asset);
            }
            stale.extend(change.stale);
        }
        let gallery = match self.images.attach_all(&patch.images, FOLDER_PRODUCTS).await {
            Ok(gallery) => gallery,
            Err(e) => {
                self.images.release_assets(&uploaded).await;
                return Err(e);
            }
        };

        for index in removals {
            if let Some((_, public_id)) = product.remove_gallery_image(index) {
                stale.extend(public_id);
            }
        }
        for asset in &gallery {
            product.push_gallery_image(asset.url.clone(), asset.public_id.clone());
        }
        uploaded.extend(gallery);

        match self.store.save_product(&product).await {
            Ok(Some(saved)) => {
                self.images.release_all(&stale).await;
                tracing::info!(
                    id,
                    main_image = ?main_action,
                    released = stale.len(),
                    gallery = saved.images.len(),
                    "Product updated"
                );
                Ok(saved)
            }
            Ok(None) => {
                self.images.release_assets(&uploaded).await;
                Err(CoreError::NotFound {
                    entity: "Product",
                    id,
                })
            }
            Err(e) => {
                self.images.release_assets(&uploaded).await;
                Err(e)
            }
        }
    }

    /// Delete a product, then release its main image and every gallery image.
    pub async fn delete_product(&self, id: DbId) -> CoreResult<()> {
        let deleted = self
            .store
            .delete_product(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Product",
                id,
            })?;
        let handles = deleted.asset_handles();
        self.images.release_all(&handles).await;
        tracing::info!(id, released = handles.len(), "Product deleted");
        Ok(())
    }

    /// Run a store write; on failure undo the image change, on success
    /// release what it made stale.
    async fn persist<T, F>(&self, change: &ImageChange, write: F) -> CoreResult<Option<T>>
    where
        F: std::future::Future<Output = CoreResult<Option<T>>>,
    {
        match write.await {
            Ok(Some(row)) => {
                self.images.commit(change).await;
                Ok(Some(row))
            }
            Ok(None) => {
                self.images.rollback(change).await;
                Ok(None)
            }
            Err(e) => {
                self.images.rollback(change).await;
                Err(e)
            }
        }
    }
}
