//! Token and password helpers consumed by the auth handlers and the
//! [`crate::middleware::auth::AuthUser`] extractor.

pub mod jwt;
pub mod password;
