//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//!
//! Updates are applied by loading the entity, changing it in memory and
//! saving the whole row back, so there are no separate update DTOs.

pub mod admin_user;
pub mod category;
pub mod contact;
pub mod dashboard;
pub mod newsletter;
pub mod product;
pub mod subcategory;
