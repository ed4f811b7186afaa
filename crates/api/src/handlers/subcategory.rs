//! Handlers for subcategories.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_catalog::{SubcategoryDetail, SubcategoryInput, SubcategoryPatch};
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_db::models::subcategory::Subcategory;

use crate::error::AppResult;
use crate::handlers::form::CatalogForm;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{CategoryIdParam, CategorySlugParam};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/subcategories?category=<slug>
pub async fn list_public(
    State(state): State<AppState>,
    Query(params): Query<CategorySlugParam>,
) -> AppResult<Json<DataResponse<Vec<Subcategory>>>> {
    let category = params.category.as_deref().filter(|s| !s.trim().is_empty());
    let subcategories = state.catalog.list_subcategories_by_slug(category).await?;
    Ok(Json(DataResponse {
        data: subcategories,
    }))
}

/// GET /api/v1/subcategories/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<SubcategoryDetail>>> {
    let detail = state.catalog.subcategory_detail(&slug).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/admin/subcategories?category_id=<id>
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<CategoryIdParam>,
) -> AppResult<Json<DataResponse<Vec<Subcategory>>>> {
    let subcategories = state.catalog.list_subcategories(params.category_id).await?;
    Ok(Json(DataResponse {
        data: subcategories,
    }))
}

/// GET /api/v1/admin/subcategories/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Subcategory>>> {
    let subcategory = state.catalog.get_subcategory(id).await?;
    Ok(Json(DataResponse { data: subcategory }))
}

/// POST /api/v1/admin/subcategories (multipart)
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Subcategory>>)> {
    let mut form = CatalogForm::parse(multipart).await?;
    let category_id = form
        .id("categoryId")?
        .ok_or_else(|| CoreError::Validation("Category is required".into()))?;
    let input = SubcategoryInput {
        name: form.text("name").unwrap_or_default(),
        slug: form.non_blank("slug"),
        description: form.text("description"),
        category_id,
        image: form.file("image"),
    };

    let subcategory = state.catalog.create_subcategory(input).await?;
    tracing::info!(
        admin_id = admin.user_id,
        id = subcategory.id,
        "Subcategory created via API"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: subcategory })))
}

/// PUT /api/v1/admin/subcategories/{id} (multipart)
///
/// A new `categoryId` moves the subcategory and its products.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Subcategory>>> {
    let mut form = CatalogForm::parse(multipart).await?;
    let patch = SubcategoryPatch {
        name: form.text("name"),
        slug: form.non_blank("slug"),
        description: form.text("description"),
        category_id: form.id("categoryId")?,
        keep_current_image: form.flag("keepCurrentImage")?,
        image: form.file("image"),
    };

    let subcategory = state.catalog.update_subcategory(id, patch).await?;
    Ok(Json(DataResponse { data: subcategory }))
}

/// DELETE /api/v1/admin/subcategories/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.catalog.delete_subcategory(id).await?;
    tracing::info!(admin_id = admin.user_id, id, "Subcategory deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
