//! Route definitions for the `/admin` resource.
//!
//! All endpoints require an administrative token.

use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST /marketers -> create_marketer (issue referral link)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/marketers", post(admin::create_marketer))
}
