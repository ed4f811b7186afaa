//! Read model for the public catalog and the admin dashboard.

use serde::Serialize;
use storefront_core::error::{CoreError, CoreResult};
use storefront_core::reference::Reference;
use storefront_core::types::DbId;
use storefront_db::models::category::Category;
use storefront_db::models::dashboard::CatalogCounts;
use storefront_db::models::product::{
    Product, ProductFilter, DEFAULT_PRODUCT_LIMIT, MAX_PRODUCT_LIMIT,
};
use storefront_db::models::subcategory::Subcategory;
use storefront_db::repositories::{clamp_limit, clamp_offset};

use crate::graph::CatalogGraph;

/// Number of related products shown on a product page.
pub const RELATED_PRODUCTS: i64 = 4;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubcategoryDetail {
    #[serde(flatten)]
    pub subcategory: Subcategory,
    pub category: Reference<Category>,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Reference<Category>,
    pub subcategory: Option<Reference<Subcategory>>,
    pub related: Vec<Product>,
}

/// Product listing query as it arrives from the public API: parents by slug.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub in_stock: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn slug_not_found(entity: &'static str, slug: &str) -> CoreError {
    CoreError::SlugNotFound {
        entity,
        slug: slug.to_string(),
    }
}

impl CatalogGraph {
    pub async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        self.store().list_categories().await
    }

    pub async fn get_category(&self, id: DbId) -> CoreResult<Category> {
        self.category(id).await
    }

    pub async fn list_subcategories(&self, category_id: Option<DbId>) -> CoreResult<Vec<Subcategory>> {
        self.store().list_subcategories(category_id).await
    }

    /// Subcategories of the category with `category_slug`, or all of them.
    pub async fn list_subcategories_by_slug(
        &self,
        category_slug: Option<&str>,
    ) -> CoreResult<Vec<Subcategory>> {
        let category_id = match category_slug {
            Some(slug) => Some(self.category_by_slug(slug).await?.id),
            None => None,
        };
        self.store().list_subcategories(category_id).await
    }

    pub async fn get_subcategory(&self, id: DbId) -> CoreResult<Subcategory> {
        self.subcategory(id).await
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> CoreResult<Vec<Product>> {
        self.store().list_products(filter).await
    }

    pub async fn get_product(&self, id: DbId) -> CoreResult<Product> {
        self.product(id).await
    }

    /// Resolve slug filters to ids, clamp paging, and list.
    pub async fn search_products(&self, query: &ProductQuery) -> CoreResult<Vec<Product>> {
        let category_id = match query.category.as_deref() {
            Some(slug) => Some(self.category_by_slug(slug).await?.id),
            None => None,
        };
        let subcategory_id = match query.subcategory.as_deref() {
            Some(slug) => Some(self.subcategory_by_slug(slug).await?.id),
            None => None,
        };
        let filter = ProductFilter {
            category_id,
            subcategory_id,
            in_stock: query.in_stock,
            search: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            exclude_id: None,
            limit: clamp_limit(query.limit, DEFAULT_PRODUCT_LIMIT, MAX_PRODUCT_LIMIT),
            offset: clamp_offset(query.offset),
        };
        self.store().list_products(&filter).await
    }

    async fn category_by_slug(&self, slug: &str) -> CoreResult<Category> {
        self.store()
            .find_category_by_slug(slug)
            .await?
            .ok_or_else(|| slug_not_found("Category", slug))
    }

    async fn subcategory_by_slug(&self, slug: &str) -> CoreResult<Subcategory> {
        self.store()
            .find_subcategory_by_slug(slug)
            .await?
            .ok_or_else(|| slug_not_found("Subcategory", slug))
    }

    pub async fn category_detail(&self, slug: &str) -> CoreResult<CategoryDetail> {
        let category = self.category_by_slug(slug).await?;
        let subcategories = self.store().list_subcategories(Some(category.id)).await?;
        let products = self
            .store()
            .list_products(&ProductFilter {
                category_id: Some(category.id),
                limit: MAX_PRODUCT_LIMIT,
                ..Default::default()
            })
            .await?;
        Ok(CategoryDetail {
            category,
            subcategories,
            products,
        })
    }

    pub async fn subcategory_detail(&self, slug: &str) -> CoreResult<SubcategoryDetail> {
        let subcategory = self.subcategory_by_slug(slug).await?;
        let category = self.store().find_category(subcategory.category_id).await?;
        let products = self
            .store()
            .list_products(&ProductFilter {
                subcategory_id: Some(subcategory.id),
                limit: MAX_PRODUCT_LIMIT,
                ..Default::default()
            })
            .await?;
        Ok(SubcategoryDetail {
            category: Reference::resolve(subcategory.category_id, category),
            subcategory,
            products,
        })
    }

    /// Product page: the product, its parents, and up to
    /// [`RELATED_PRODUCTS`] siblings from the same subcategory (falling back
    /// to the same category).
    pub async fn product_detail(&self, slug: &str) -> CoreResult<ProductDetail> {
        let product = self
            .store()
            .find_product_by_slug(slug)
            .await?
            .ok_or_else(|| slug_not_found("Product", slug))?;

        let category = self.store().find_category(product.category_id).await?;
        let subcategory = match product.subcategory_id {
            Some(id) => Some(Reference::resolve(id, self.store().find_subcategory(id).await?)),
            None => None,
        };

        let mut related = Vec::new();
        if product.subcategory_id.is_some() {
            related = self
                .store()
                .list_products(&ProductFilter {
                    subcategory_id: product.subcategory_id,
                    exclude_id: Some(product.id),
                    limit: RELATED_PRODUCTS,
                    ..Default::default()
                })
                .await?;
        }
        if related.is_empty() {
            related = self
                .store()
                .list_products(&ProductFilter {
                    category_id: Some(product.category_id),
                    exclude_id: Some(product.id),
                    limit: RELATED_PRODUCTS,
                    ..Default::default()
                })
                .await?;
        }

        Ok(ProductDetail {
            category: Reference::resolve(product.category_id, category),
            subcategory,
            related,
            product,
        })
    }

    pub async fn counts(&self) -> CoreResult<CatalogCounts> {
        self.store().catalog_counts().await
    }
}
