//! Catalog and inbox services.
//!
//! [`CatalogGraph`] owns every write to categories, subcategories and
//! products. It leans on [`SlugAssigner`] for identity and on
//! [`ImageAttachment`] for hosted images; both are leaves. [`Inbox`] handles
//! contact submissions and newsletter subscriptions.

pub mod attachment;
pub mod graph;
pub mod inbox;
pub mod slugs;
pub mod views;

pub use attachment::{ImageAttachment, ImageChange};
pub use graph::{
    CatalogGraph, CategoryInput, CategoryPatch, ProductInput, ProductPatch, SubcategoryInput,
    SubcategoryPatch,
};
pub use inbox::{ContactInput, Inbox};
pub use slugs::SlugAssigner;
pub use views::{CategoryDetail, ProductDetail, ProductQuery, SubcategoryDetail};
