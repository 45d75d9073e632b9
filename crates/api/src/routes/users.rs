//! Route definitions for the `/users` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET /              -> list_users
/// GET /me            -> my_profile
/// PUT /me            -> update_profile
/// GET /me/referrals  -> my_referrals
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users))
        .route("/me", get(users::my_profile).put(users::update_profile))
        .route("/me/referrals", get(users::my_referrals))
}
