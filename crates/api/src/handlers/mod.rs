//! Request handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod conversations;
pub mod providers;
pub mod users;
