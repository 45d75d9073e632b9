//! Route definitions for the `/providers` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::providers;
use crate::state::AppState;

/// Routes mounted at `/providers`.
///
/// ```text
/// GET /nearby -> nearby (distance-ranked geo matching)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/nearby", get(providers::nearby))
}
