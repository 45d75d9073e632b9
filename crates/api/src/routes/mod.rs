//! Route registration.

pub mod admin;
pub mod auth;
pub mod conversations;
pub mod health;
pub mod providers;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/providers", providers::router())
        .nest("/conversations", conversations::router())
        .nest("/admin", admin::router())
}
