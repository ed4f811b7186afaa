//! Handlers for categories: public reads by slug, admin CRUD by id.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_catalog::{CategoryDetail, CategoryInput, CategoryPatch};
use storefront_core::types::DbId;
use storefront_db::models::category::Category;

use crate::error::AppResult;
use crate::handlers::form::CatalogForm;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list_public(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/categories/{slug}
///
/// The category with its subcategories and products.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<CategoryDetail>>> {
    let detail = state.catalog.category_detail(&slug).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/admin/categories
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/admin/categories/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Category>>> {
    let category = state.catalog.get_category(id).await?;
    Ok(Json(DataResponse { data: category }))
}

/// POST /api/v1/admin/categories (multipart)
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    let mut form = CatalogForm::parse(multipart).await?;
    let input = CategoryInput {
        name: form.text("name").unwrap_or_default(),
        slug: form.non_blank("slug"),
        description: form.text("description"),
        image: form.file("image"),
    };

    let category = state.catalog.create_category(input).await?;
    tracing::info!(admin_id = admin.user_id, id = category.id, "Category created via API");
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/admin/categories/{id} (multipart)
///
/// Omitted fields stay unchanged. The image follows the keep/replace/clear
/// rules driven by `image` and `keepCurrentImage`.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Category>>> {
    let mut form = CatalogForm::parse(multipart).await?;
    let patch = CategoryPatch {
        name: form.text("name"),
        slug: form.non_blank("slug"),
        description: form.text("description"),
        keep_current_image: form.flag("keepCurrentImage")?,
        image: form.file("image"),
    };

    let category = state.catalog.update_category(id, patch).await?;
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/admin/categories/{id}
///
/// 409 while subcategories or products still reference the category.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.catalog.delete_category(id).await?;
    tracing::info!(admin_id = admin.user_id, id, "Category deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
