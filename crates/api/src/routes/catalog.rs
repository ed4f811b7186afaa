//! Public catalog routes. No credential required.

use axum::routing::get;
use axum::Router;

use crate::handlers::{category, product, subcategory};
use crate::state::AppState;

/// ```text
/// GET /categories                 -> list_public
/// GET /categories/{slug}          -> get_by_slug
/// GET /subcategories?category=    -> list_public
/// GET /subcategories/{slug}       -> get_by_slug
/// GET /products?...               -> list_public
/// GET /products/{slug}            -> get_by_slug
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(category::list_public))
        .route("/categories/{slug}", get(category::get_by_slug))
        .route("/subcategories", get(subcategory::list_public))
        .route("/subcategories/{slug}", get(subcategory::get_by_slug))
        .route("/products", get(product::list_public))
        .route("/products/{slug}", get(product::get_by_slug))
}
