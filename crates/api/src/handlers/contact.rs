//! Handlers for the contact form and its admin inbox.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storefront_catalog::ContactInput;
use storefront_core::status::ContactStatus;
use storefront_db::models::contact::ContactSubmission;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::StatusParam;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /contact`. Missing required fields surface as
/// validation errors from the inbox, not as deserialization failures.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Request body for status changes.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// POST /api/v1/contact
pub async fn submit(
    State(state): State<AppState>,
    Json(input): Json<ContactRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ContactSubmission>>)> {
    let contact = state
        .inbox
        .submit_contact(ContactInput {
            name: input.name,
            email: input.email,
            phone: input.phone,
            company: input.company,
            subject: input.subject,
            message: input.message,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: contact })))
}

/// GET /api/v1/admin/contacts?status=new|read|replied
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<StatusParam>,
) -> AppResult<Json<DataResponse<Vec<ContactSubmission>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<ContactStatus>)
        .transpose()?;
    let contacts = state.inbox.list_contacts(status).await?;
    Ok(Json(DataResponse { data: contacts }))
}

/// GET /api/v1/admin/contacts/{slug}
pub async fn get_by_slug(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<ContactSubmission>>> {
    let contact = state.inbox.get_contact(&slug).await?;
    Ok(Json(DataResponse { data: contact }))
}

/// PUT /api/v1/admin/contacts/{slug}/status
pub async fn set_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<StatusUpdate>,
) -> AppResult<Json<DataResponse<ContactSubmission>>> {
    let status: ContactStatus = input.status.parse()?;
    let contact = state.inbox.set_contact_status(&slug, status).await?;
    Ok(Json(DataResponse { data: contact }))
}

/// DELETE /api/v1/admin/contacts/{slug}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    state.inbox.delete_contact(&slug).await?;
    tracing::info!(admin_id = admin.user_id, %slug, "Contact submission deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
