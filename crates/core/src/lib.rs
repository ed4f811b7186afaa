//! Domain rules for the storefront: error taxonomy, slugs, image policy,
//! inbox statuses and field validation.
//!
//! This crate has no internal dependencies so the store, catalog and API
//! layers can all share it.

pub mod error;
pub mod image;
pub mod reference;
pub mod roles;
pub mod slug;
pub mod status;
pub mod types;
pub mod validation;
