//! Aggregate queries for the admin dashboard.

use sqlx::PgPool;

use crate::models::dashboard::{CatalogCounts, InboxCounts};

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn catalog_counts(pool: &PgPool) -> Result<CatalogCounts, sqlx::Error> {
        sqlx::query_as::<_, CatalogCounts>(
            "SELECT
                (SELECT COUNT(*) FROM categories) AS categories,
                (SELECT COUNT(*) FROM subcategories) AS subcategories,
                (SELECT COUNT(*) FROM products) AS products,
                (SELECT COUNT(*) FROM products WHERE in_stock) AS products_in_stock",
        )
        .fetch_one(pool)
        .await
    }

    pub async fn inbox_counts(pool: &PgPool) -> Result<InboxCounts, sqlx::Error> {
        sqlx::query_as::<_, InboxCounts>(
            "SELECT
                (SELECT COUNT(*) FROM contact_submissions) AS contacts,
                (SELECT COUNT(*) FROM contact_submissions WHERE status = 'new') AS contacts_new,
                (SELECT COUNT(*) FROM newsletter_subscriptions) AS subscribers,
                (SELECT COUNT(*) FROM newsletter_subscriptions WHERE status = 'active') AS subscribers_active",
        )
        .fetch_one(pool)
        .await
    }
}
