//! Repository for the `newsletter_subscriptions` table.

use sqlx::PgPool;
use storefront_core::status::SubscriptionStatus;
use storefront_core::types::DbId;

use crate::models::newsletter::{NewSubscription, NewsletterSubscription};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, email, status, slug, subscribed_at, unsubscribed_at, created_at, updated_at";

/// Provides CRUD operations for newsletter subscriptions.
pub struct NewsletterRepo;

impl NewsletterRepo {
    /// Insert a new active subscription.
    pub async fn create(
        pool: &PgPool,
        input: &NewSubscription,
    ) -> Result<NewsletterSubscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO newsletter_subscriptions (email, slug)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NewsletterSubscription>(&query)
            .bind(&input.email)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Find a subscription by (normalized) email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<NewsletterSubscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM newsletter_subscriptions WHERE email = $1");
        sqlx::query_as::<_, NewsletterSubscription>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a subscription by its slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<NewsletterSubscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM newsletter_subscriptions WHERE slug = $1");
        sqlx::query_as::<_, NewsletterSubscription>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List subscriptions newest first, optionally restricted to one status.
    pub async fn list(
        pool: &PgPool,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<NewsletterSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM newsletter_subscriptions
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY subscribed_at DESC, id DESC"
        );
        sqlx::query_as::<_, NewsletterSubscription>(&query)
            .bind(status.map(SubscriptionStatus::as_str))
            .fetch_all(pool)
            .await
    }

    /// Write status and lifecycle timestamps.
    pub async fn save(
        pool: &PgPool,
        subscription: &NewsletterSubscription,
    ) -> Result<Option<NewsletterSubscription>, sqlx::Error> {
        let query = format!(
            "UPDATE newsletter_subscriptions SET
                status = $2,
                subscribed_at = $3,
                unsubscribed_at = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NewsletterSubscription>(&query)
            .bind(subscription.id)
            .bind(subscription.status.as_str())
            .bind(subscription.subscribed_at)
            .bind(subscription.unsubscribed_at)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a subscription. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM newsletter_subscriptions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
