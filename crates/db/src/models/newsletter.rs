//! Newsletter subscription model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::status::SubscriptionStatus;
use storefront_core::types::{DbId, Timestamp};

/// A row from the `newsletter_subscriptions` table. One row per email.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub id: DbId,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub status: SubscriptionStatus,
    pub slug: String,
    pub subscribed_at: Timestamp,
    pub unsubscribed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new, active subscription.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub email: String,
    pub slug: String,
}
