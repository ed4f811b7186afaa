pub mod auth;
pub mod category;
pub mod contact;
pub mod dashboard;
pub mod form;
pub mod newsletter;
pub mod product;
pub mod subcategory;
