//! Repository for the `products` table.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::product::{NewProduct, Product, ProductFilter};
use crate::repositories::escape_like;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, short_description, description, price, \
    main_image, main_image_public_id, images, image_public_ids, \
    category_id, subcategory_id, features, in_stock, created_at, updated_at";

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (name, slug, short_description, description, price, \
                main_image, main_image_public_id, images, image_public_ids, \
                category_id, subcategory_id, features, in_stock) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.short_description)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.main_image)
            .bind(&input.main_image_public_id)
            .bind(&input.images)
            .bind(&input.image_public_ids)
            .bind(input.category_id)
            .bind(input.subcategory_id)
            .bind(&input.features)
            .bind(input.in_stock)
            .fetch_one(pool)
            .await
    }

    /// Find a product by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a product by its slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE slug = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List products matching `filter`, newest first.
    pub async fn list(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products \
             WHERE ($1::BIGINT IS NULL OR category_id = $1) \
               AND ($2::BIGINT IS NULL OR subcategory_id = $2) \
               AND ($3::BOOLEAN IS NULL OR in_stock = $3) \
               AND ($4::TEXT IS NULL \
                    OR name ILIKE '%' || $4 || '%' \
                    OR short_description ILIKE '%' || $4 || '%') \
               AND ($5::BIGINT IS NULL OR id <> $5) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(filter.category_id)
            .bind(filter.subcategory_id)
            .bind(filter.in_stock)
            .bind(filter.search.as_deref().map(escape_like))
            .bind(filter.exclude_id)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Whether another product already uses `slug`.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Write all mutable columns. Returns `None` if no row with the given `id` exists.
    pub async fn save(pool: &PgPool, product: &Product) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET \
                name = $2, \
                slug = $3, \
                short_description = $4, \
                description = $5, \
                price = $6, \
                main_image = $7, \
                main_image_public_id = $8, \
                images = $9, \
                image_public_ids = $10, \
                category_id = $11, \
                subcategory_id = $12, \
                features = $13, \
                in_stock = $14, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.slug)
            .bind(&product.short_description)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.main_image)
            .bind(&product.main_image_public_id)
            .bind(&product.images)
            .bind(&product.image_public_ids)
            .bind(product.category_id)
            .bind(product.subcategory_id)
            .bind(&product.features)
            .bind(product.in_stock)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a product, returning the removed row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("DELETE FROM products WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
