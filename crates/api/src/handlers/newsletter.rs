//! Handlers for newsletter sign-up and its admin list.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storefront_core::status::SubscriptionStatus;
use storefront_db::models::newsletter::NewsletterSubscription;

use crate::error::AppResult;
use crate::handlers::contact::StatusUpdate;
use crate::middleware::rbac::RequireAdmin;
use crate::query::StatusParam;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: String,
}

/// POST /api/v1/newsletter/subscribe
///
/// 201 for a new or reactivated subscription; 400 when already active.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(input): Json<EmailRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<NewsletterSubscription>>)> {
    let subscription = state.inbox.subscribe(&input.email).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: subscription })))
}

/// POST /api/v1/newsletter/unsubscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(input): Json<EmailRequest>,
) -> AppResult<Json<DataResponse<NewsletterSubscription>>> {
    let subscription = state.inbox.unsubscribe(&input.email).await?;
    Ok(Json(DataResponse { data: subscription }))
}

/// GET /api/v1/newsletter/unsubscribe/{slug}
///
/// One-click unsubscribe link target.
pub async fn unsubscribe_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<NewsletterSubscription>>> {
    let subscription = state.inbox.unsubscribe_by_slug(&slug).await?;
    Ok(Json(DataResponse { data: subscription }))
}

/// GET /api/v1/admin/newsletter?status=active|inactive
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<StatusParam>,
) -> AppResult<Json<DataResponse<Vec<NewsletterSubscription>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<SubscriptionStatus>)
        .transpose()?;
    let subscriptions = state.inbox.list_subscriptions(status).await?;
    Ok(Json(DataResponse {
        data: subscriptions,
    }))
}

/// PUT /api/v1/admin/newsletter/{slug}/status
pub async fn set_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<StatusUpdate>,
) -> AppResult<Json<DataResponse<NewsletterSubscription>>> {
    let status: SubscriptionStatus = input.status.parse()?;
    let subscription = state.inbox.set_subscription_status(&slug, status).await?;
    Ok(Json(DataResponse { data: subscription }))
}

/// DELETE /api/v1/admin/newsletter/{slug}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    state.inbox.delete_subscription(&slug).await?;
    tracing::info!(admin_id = admin.user_id, %slug, "Newsletter subscription deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
