//! Query parameter types shared across handler modules.

use serde::Deserialize;
use storefront_catalog::ProductQuery;
use storefront_core::types::DbId;
use storefront_db::models::product::{ProductFilter, DEFAULT_PRODUCT_LIMIT, MAX_PRODUCT_LIMIT};
use storefront_db::repositories::{clamp_limit, clamp_offset};

/// Public product listing (`?category=&subcategory=&in_stock=&search=&limit=&offset=`).
/// Parents are addressed by slug.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub in_stock: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ProductListParams> for ProductQuery {
    fn from(params: ProductListParams) -> Self {
        Self {
            category: params.category.filter(|s| !s.trim().is_empty()),
            subcategory: params.subcategory.filter(|s| !s.trim().is_empty()),
            in_stock: params.in_stock,
            search: params.search,
            limit: params.limit,
            offset: params.offset,
        }
    }
}

/// Admin product listing. Parents are addressed by id.
#[derive(Debug, Default, Deserialize)]
pub struct AdminProductParams {
    pub category_id: Option<DbId>,
    pub subcategory_id: Option<DbId>,
    pub in_stock: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<AdminProductParams> for ProductFilter {
    fn from(params: AdminProductParams) -> Self {
        Self {
            category_id: params.category_id,
            subcategory_id: params.subcategory_id,
            in_stock: params.in_stock,
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            exclude_id: None,
            limit: clamp_limit(params.limit, DEFAULT_PRODUCT_LIMIT, MAX_PRODUCT_LIMIT),
            offset: clamp_offset(params.offset),
        }
    }
}

/// `?category=<slug>` on the public subcategory listing.
#[derive(Debug, Default, Deserialize)]
pub struct CategorySlugParam {
    pub category: Option<String>,
}

/// `?category_id=<id>` on the admin subcategory listing.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryIdParam {
    pub category_id: Option<DbId>,
}

/// `?status=` on inbox listings. Parsed by the handler into the matching
/// status enum so a bad value yields a validation error, not a 422.
#[derive(Debug, Default, Deserialize)]
pub struct StatusParam {
    pub status: Option<String>,
}
