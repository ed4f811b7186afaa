//! Admin routes. Every handler here takes [`RequireAdmin`].
//!
//! [`RequireAdmin`]: crate::middleware::rbac::RequireAdmin

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::{category, contact, dashboard, newsletter, product, subcategory};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET                /dashboard
/// GET, POST          /categories         GET, PUT, DELETE /categories/{id}
/// GET, POST          /subcategories      GET, PUT, DELETE /subcategories/{id}
/// GET, POST          /products           GET, PUT, DELETE /products/{id}
/// GET                /contacts           GET, DELETE      /contacts/{slug}
/// PUT                /contacts/{slug}/status
/// GET                /newsletter         DELETE           /newsletter/{slug}
/// PUT                /newsletter/{slug}/status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::summary))
        .route("/categories", get(category::list).post(category::create))
        .route(
            "/categories/{id}",
            get(category::get_by_id)
                .put(category::update)
                .delete(category::delete),
        )
        .route(
            "/subcategories",
            get(subcategory::list).post(subcategory::create),
        )
        .route(
            "/subcategories/{id}",
            get(subcategory::get_by_id)
                .put(subcategory::update)
                .delete(subcategory::delete),
        )
        .route("/products", get(product::list).post(product::create))
        .route(
            "/products/{id}",
            get(product::get_by_id)
                .put(product::update)
                .delete(product::delete),
        )
        .route("/contacts", get(contact::list))
        .route(
            "/contacts/{slug}",
            get(contact::get_by_slug).delete(contact::delete),
        )
        .route("/contacts/{slug}/status", put(contact::set_status))
        .route("/newsletter", get(newsletter::list))
        .route("/newsletter/{slug}", delete(newsletter::delete))
        .route("/newsletter/{slug}/status", put(newsletter::set_status))
}
