//! Product entity model, DTOs and list filter.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::reference::Named;
use storefront_core::types::{DbId, Timestamp};

/// A product row from the `products` table.
///
/// `images` and `image_public_ids` are parallel arrays: position `i` of one
/// always describes the same gallery asset as position `i` of the other.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    /// Never empty for a persisted product.
    pub main_image: String,
    pub main_image_public_id: Option<String>,
    pub images: Vec<String>,
    pub image_public_ids: Vec<String>,
    pub category_id: DbId,
    pub subcategory_id: Option<DbId>,
    pub features: Vec<String>,
    pub in_stock: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// Append a gallery image at the end of both parallel arrays.
    pub fn push_gallery_image(&mut self, url: String, public_id: String) {
        self.images.push(url);
        self.image_public_ids.push(public_id);
    }

    /// Remove the gallery image at `index`, returning its `(url, public_id)`.
    ///
    /// Returns `None` when `index` is out of range.
    pub fn remove_gallery_image(&mut self, index: usize) -> Option<(String, Option<String>)> {
        if index >= self.images.len() {
            return None;
        }
        let url = self.images.remove(index);
        let public_id = (index < self.image_public_ids.len())
            .then(|| self.image_public_ids.remove(index));
        Some((url, public_id))
    }

    /// Every asset handle this product owns (main image first).
    pub fn asset_handles(&self) -> Vec<String> {
        self.main_image_public_id
            .iter()
            .chain(self.image_public_ids.iter())
            .filter(|id| !id.is_empty())
            .cloned()
            .collect()
    }
}

impl Named for Product {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// DTO for inserting a product. Images are already uploaded by the caller.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub main_image: String,
    pub main_image_public_id: Option<String>,
    pub images: Vec<String>,
    pub image_public_ids: Vec<String>,
    pub category_id: DbId,
    pub subcategory_id: Option<DbId>,
    pub features: Vec<String>,
    pub in_stock: bool,
}

/// Default page size for product listings.
pub const DEFAULT_PRODUCT_LIMIT: i64 = 50;

/// Upper bound on product listing page size.
pub const MAX_PRODUCT_LIMIT: i64 = 200;

/// Filter for product listings. `None` fields do not constrain the result.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub category_id: Option<DbId>,
    pub subcategory_id: Option<DbId>,
    pub in_stock: Option<bool>,
    /// Case-insensitive substring matched against name and short description.
    pub search: Option<String>,
    pub exclude_id: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category_id: None,
            subcategory_id: None,
            in_stock: None,
            search: None,
            exclude_id: None,
            limit: DEFAULT_PRODUCT_LIMIT,
            offset: 0,
        }
    }
}

impl ProductFilter {
    /// Whether `product` passes every constraint except paging.
    pub fn matches(&self, product: &Product) -> bool {
        if self.category_id.is_some_and(|id| product.category_id != id) {
            return false;
        }
        if self
            .subcategory_id
            .is_some_and(|id| product.subcategory_id != Some(id))
        {
            return false;
        }
        if self.in_stock.is_some_and(|flag| product.in_stock != flag) {
            return false;
        }
        if self.exclude_id == Some(product.id) {
            return false;
        }
        if let Some(term) = self.search.as_deref().map(str::to_lowercase) {
            let in_name = product.name.to_lowercase().contains(&term);
            let in_short = product
                .short_description
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&term));
            if !in_name && !in_short {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product() -> Product {
        Product {
            id: 1,
            name: "PTZ Pro".into(),
            slug: "ptz-pro".into(),
            short_description: Some("Motorized zoom".into()),
            description: None,
            price: 499.99,
            main_image: "https://cdn.test/main.jpg".into(),
            main_image_public_id: Some("products/main".into()),
            images: vec!["a".into(), "b".into(), "c".into()],
            image_public_ids: vec!["pa".into(), "pb".into(), "pc".into()],
            category_id: 10,
            subcategory_id: Some(20),
            features: vec![],
            in_stock: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn remove_gallery_image_keeps_arrays_aligned() {
        let mut p = product();
        let removed = p.remove_gallery_image(1).unwrap();
        assert_eq!(removed, ("b".to_string(), Some("pb".to_string())));
        assert_eq!(p.images, vec!["a", "c"]);
        assert_eq!(p.image_public_ids, vec!["pa", "pc"]);
        assert!(p.remove_gallery_image(5).is_none());
    }

    #[test]
    fn asset_handles_lists_main_then_gallery() {
        let p = product();
        assert_eq!(p.asset_handles(), vec!["products/main", "pa", "pb", "pc"]);
    }

    #[test]
    fn filter_matching() {
        let p = product();
        assert!(ProductFilter::default().matches(&p));

        let by_category = ProductFilter {
            category_id: Some(11),
            ..Default::default()
        };
        assert!(!by_category.matches(&p));

        let by_search = ProductFilter {
            search: Some("ZOOM".into()),
            ..Default::default()
        };
        assert!(by_search.matches(&p));

        let excluded = ProductFilter {
            exclude_id: Some(1),
            ..Default::default()
        };
        assert!(!excluded.matches(&p));

        let out_of_stock = ProductFilter {
            in_stock: Some(false),
            ..Default::default()
        };
        assert!(!out_of_stock.matches(&p));
    }
}
