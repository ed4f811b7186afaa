//! Handlers for products.
//!
//! Writes are multipart: text fields plus `mainImage` and repeated `images`
//! files. See [`CatalogForm`] for the accepted field encodings.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_catalog::{ProductDetail, ProductInput, ProductPatch};
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_db::models::product::{Product, ProductFilter};

use crate::error::AppResult;
use crate::handlers::form::CatalogForm;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{AdminProductParams, ProductListParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/products
///
/// Filters: `category` and `subcategory` slugs, `in_stock`, `search`,
/// `limit` (default 50, max 200) and `offset`.
pub async fn list_public(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    let products = state.catalog.search_products(&params.into()).await?;
    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/products/{slug}
///
/// The product with its parents and related products.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<ProductDetail>>> {
    let detail = state.catalog.product_detail(&slug).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/admin/products
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminProductParams>,
) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    let filter = ProductFilter::from(params);
    let products = state.catalog.list_products(&filter).await?;
    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/admin/products/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = state.catalog.get_product(id).await?;
    Ok(Json(DataResponse { data: product }))
}

/// POST /api/v1/admin/products (multipart)
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    let mut form = CatalogForm::parse(multipart).await?;
    let category_id = form
        .id("categoryId")?
        .ok_or_else(|| CoreError::Validation("Category is required".into()))?;
    let price = form
        .price("price")?
        .ok_or_else(|| CoreError::Validation("Price is required".into()))?;

    let input = ProductInput {
        name: form.text("name").unwrap_or_default(),
        slug: form.non_blank("slug"),
        short_description: form.text("shortDescription"),
        description: form.text("description"),
        price,
        category_id,
        subcategory_id: form.nullable_id("subcategoryId")?.flatten(),
        features: form.features("features")?.unwrap_or_default(),
        in_stock: form.optional_bool("inStock")?,
        main_image: form.file("mainImage"),
        images: form.files("images"),
    };

    let product = state.catalog.create_product(input).await?;
    tracing::info!(admin_id = admin.user_id, id = product.id, "Product created via API");
    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// PUT /api/v1/admin/products/{id} (multipart)
///
/// The main image must either be replaced (`mainImage`) or kept
/// (`keepCurrentMainImage=true`). `removeImageIndices` refers to gallery
/// positions before this update; new `images` are appended.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Product>>> {
    let mut form = CatalogForm::parse(multipart).await?;
    let patch = ProductPatch {
        name: form.text("name"),
        slug: form.non_blank("slug"),
        short_description: form.text("shortDescription"),
        description: form.text("description"),
        price: form.price("price")?,
        category_id: form.id("categoryId")?,
        subcategory_id: form.nullable_id("subcategoryId")?,
        features: form.features("features")?,
        in_stock: form.optional_bool("inStock")?,
        keep_current_main_image: form.flag("keepCurrentMainImage")?,
        remove_image_indices: form.indices("removeImageIndices")?,
        main_image: form.file("mainImage"),
        images: form.files("images"),
    };

    let product = state.catalog.update_product(id, patch).await?;
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/v1/admin/products/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.catalog.delete_product(id).await?;
    tracing::info!(admin_id = admin.user_id, id, "Product deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
