//! Repository for the `contact_submissions` table.

use sqlx::PgPool;
use storefront_core::status::ContactStatus;
use storefront_core::types::DbId;

use crate::models::contact::{ContactSubmission, NewContactSubmission};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, email, phone, company, subject, message, status, slug, created_at, updated_at";

/// Provides CRUD operations for contact submissions.
pub struct ContactRepo;

impl ContactRepo {
    /// Insert a new submission with status `new`.
    pub async fn create(
        pool: &PgPool,
        input: &NewContactSubmission,
    ) -> Result<ContactSubmission, sqlx::Error> {
        let query = format!(
            "INSERT INTO contact_submissions (name, email, phone, company, subject, message, slug)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactSubmission>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.subject)
            .bind(&input.message)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// List submissions newest first, optionally restricted to one status.
    pub async fn list(
        pool: &PgPool,
        status: Option<ContactStatus>,
    ) -> Result<Vec<ContactSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contact_submissions
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ContactSubmission>(&query)
            .bind(status.map(ContactStatus::as_str))
            .fetch_all(pool)
            .await
    }

    /// Find a submission by its slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<ContactSubmission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contact_submissions WHERE slug = $1");
        sqlx::query_as::<_, ContactSubmission>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Change the status of a submission.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: ContactStatus,
    ) -> Result<Option<ContactSubmission>, sqlx::Error> {
        let query = format!(
            "UPDATE contact_submissions SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactSubmission>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a submission. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
