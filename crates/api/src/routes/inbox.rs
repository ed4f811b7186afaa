//! Public contact and newsletter routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{contact, newsletter};
use crate::state::AppState;

/// ```text
/// POST /contact                          -> submit
/// POST /newsletter/subscribe             -> subscribe
/// POST /newsletter/unsubscribe           -> unsubscribe
/// GET  /newsletter/unsubscribe/{slug}    -> unsubscribe_by_slug
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", post(contact::submit))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .route("/newsletter/unsubscribe", post(newsletter::unsubscribe))
        .route(
            "/newsletter/unsubscribe/{slug}",
            get(newsletter::unsubscribe_by_slug),
        )
}
