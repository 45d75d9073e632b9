//! Route definitions for the `/conversations` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::conversations;
use crate::state::AppState;

/// Routes mounted at `/conversations`.
///
/// ```text
/// GET  /           -> list
/// POST /           -> upsert (find-or-create + record activity)
/// POST /{id}/view  -> mark_viewed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(conversations::list).post(conversations::upsert),
        )
        .route("/{id}/view", post(conversations::mark_viewed))
}
