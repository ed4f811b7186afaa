//! Contact form submission model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::status::ContactStatus;
use storefront_core::types::{DbId, Timestamp};

/// A row from the `contact_submissions` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub status: ContactStatus,
    /// Opaque external identifier used by the admin views.
    pub slug: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a contact submission. Status always starts as `new`.
#[derive(Debug, Clone)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub slug: String,
}
