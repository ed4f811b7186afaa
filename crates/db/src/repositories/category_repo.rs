//! Repository for the `categories` table.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::category::{Category, NewCategory};
use crate::store::{DeleteOutcome, Dependents};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, slug, description, image, image_public_id, created_at, updated_at";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, slug, description, image, image_public_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.image)
            .bind(&input.image_public_id)
            .fetch_one(pool)
            .await
    }

    /// Find a category by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a category by its slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE slug = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all categories ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY name, id");
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    /// Whether another category already uses `slug`.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Whether another category already uses `name`.
    pub async fn name_exists(
        pool: &PgPool,
        name: &str,
        exclude: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Write all mutable columns. Returns `None` if no row with the given `id` exists.
    pub async fn save(pool: &PgPool, category: &Category) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = $2,
                slug = $3,
                description = $4,
                image = $5,
                image_public_id = $6,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(&category.image)
            .bind(&category.image_public_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category unless it still has dependents.
    ///
    /// The category row is locked `FOR UPDATE` before counting, so a
    /// concurrent insert of a subcategory or product referencing it (which
    /// needs a key-share lock on the same row for its foreign key) waits until
    /// this transaction finishes and then fails the foreign-key check.
    pub async fn delete_unreferenced(
        pool: &PgPool,
        id: DbId,
    ) -> Result<DeleteOutcome<Category>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        let (subcategories, products): (i64, i64) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM subcategories WHERE category_id = $1),
                (SELECT COUNT(*) FROM products WHERE category_id = $1 AND subcategory_id IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let deps = Dependents {
            subcategories,
            products,
        };
        if !deps.is_empty() {
            tx.rollback().await?;
            return Ok(DeleteOutcome::Blocked(deps));
        }

        let query = format!("DELETE FROM categories WHERE id = $1 RETURNING {COLUMNS}");
        let deleted = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(DeleteOutcome::Deleted(deleted))
    }
}
