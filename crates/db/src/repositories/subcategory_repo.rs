//! Repository for the `subcategories` table.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::subcategory::{NewSubcategory, Subcategory};
use crate::store::{DeleteOutcome, Dependents};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, slug, description, image, image_public_id, category_id, created_at, updated_at";

/// Provides CRUD operations for subcategories.
pub struct SubcategoryRepo;

impl SubcategoryRepo {
    /// Insert a new subcategory, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewSubcategory,
    ) -> Result<Subcategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO subcategories (name, slug, description, image, image_public_id, category_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.image)
            .bind(&input.image_public_id)
            .bind(input.category_id)
            .fetch_one(pool)
            .await
    }

    /// Find a subcategory by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subcategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subcategories WHERE id = $1");
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a subcategory by its slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Subcategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subcategories WHERE slug = $1");
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List subcategories ordered by name, optionally only those of one category.
    pub async fn list(
        pool: &PgPool,
        category_id: Option<DbId>,
    ) -> Result<Vec<Subcategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subcategories
             WHERE ($1::BIGINT IS NULL OR category_id = $1)
             ORDER BY name, id"
        );
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Whether another subcategory already uses `slug`.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM subcategories WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Write all mutable columns and keep child products on the same category.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn save(
        pool: &PgPool,
        subcategory: &Subcategory,
    ) -> Result<Option<Subcategory>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE subcategories SET
                name = $2,
                slug = $3,
                description = $4,
                image = $5,
                image_public_id = $6,
                category_id = $7,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Subcategory>(&query)
            .bind(subcategory.id)
            .bind(&subcategory.name)
            .bind(&subcategory.slug)
            .bind(&subcategory.description)
            .bind(&subcategory.image)
            .bind(&subcategory.image_public_id)
            .bind(subcategory.category_id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(row) = &saved {
            let moved = sqlx::query(
                "UPDATE products SET category_id = $2, updated_at = NOW()
                 WHERE subcategory_id = $1 AND category_id <> $2",
            )
            .bind(row.id)
            .bind(row.category_id)
            .execute(&mut *tx)
            .await?;
            if moved.rows_affected() > 0 {
                tracing::info!(
                    subcategory_id = row.id,
                    category_id = row.category_id,
                    products = moved.rows_affected(),
                    "Moved products with re-parented subcategory"
                );
            }
        }

        tx.commit().await?;
        Ok(saved)
    }

    /// Delete a subcategory unless products still reference it.
    ///
    /// Same locking scheme as `CategoryRepo::delete_unreferenced`.
    pub async fn delete_unreferenced(
        pool: &PgPool,
        id: DbId,
    ) -> Result<DeleteOutcome<Subcategory>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM subcategories WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        let (products,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM products WHERE subcategory_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if products > 0 {
            tx.rollback().await?;
            return Ok(DeleteOutcome::Blocked(Dependents {
                subcategories: 0,
                products,
            }));
        }

        let query = format!("DELETE FROM subcategories WHERE id = $1 RETURNING {COLUMNS}");
        let deleted = sqlx::query_as::<_, Subcategory>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(DeleteOutcome::Deleted(deleted))
    }
}
