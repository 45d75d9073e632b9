//! Handler for geo-proximity provider matching.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;

use cityfix_db::models::page::Page;
use cityfix_db::models::user::MatchedProvider;
use cityfix_db::repositories::MatchRepo;
use cityfix_db::store;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/providers/nearby
///
/// Distance-ranked providers around `lat`/`lng`, nearest first. Accepts the
/// usual filter keys plus `boost=true` to restrict to providers with an
/// unexpired subscription. The scan radius is a server-side ceiling, never
/// a client input; a missing or invalid origin is a 400.
pub async fn nearby(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> AppResult<Json<DataResponse<Page<MatchedProvider>>>> {
    let geo = state.normalizer.normalize_match(&raw)?;
    let page = store::read(state.store_timeout(), || {
        MatchRepo::match_providers(&state.pool, &geo)
    })
    .await?;

    Ok(Json(DataResponse { data: page }))
}
