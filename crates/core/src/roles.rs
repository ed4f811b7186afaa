//! Well-known role name constants.
//!
//! These must match the `role` check constraint on `admin_users`.

pub const ROLE_ADMIN: &str = "admin";
