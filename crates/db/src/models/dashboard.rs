//! Aggregate counts shown on the admin dashboard.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct CatalogCounts {
    pub categories: i64,
    pub subcategories: i64,
    pub products: i64,
    pub products_in_stock: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct InboxCounts {
    pub contacts: i64,
    pub contacts_new: i64,
    pub subscribers: i64,
    pub subscribers_active: i64,
}
