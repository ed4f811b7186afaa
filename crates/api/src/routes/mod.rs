pub mod admin;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod inbox;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/...            login, logout, me
/// /categories/...      public catalog reads
/// /subcategories/...
/// /products/...
/// /contact             contact form
/// /newsletter/...      subscribe, unsubscribe
/// /admin/...           admin-only CRUD, inbox and dashboard
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(catalog::router())
        .merge(inbox::router())
        .nest("/admin", admin::router())
}
