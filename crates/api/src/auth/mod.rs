//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session token generation and validation.
//! - [`cookie`] -- the `Set-Cookie` / `Cookie` side of carrying that token.

pub mod cookie;
pub mod jwt;
pub mod password;
