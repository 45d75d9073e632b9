//! Handlers for the `/users` resource.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;

use cityfix_core::error::CoreError;
use cityfix_core::geo::GeoPoint;
use cityfix_core::query::QueryEntity;
use cityfix_core::types::DbId;
use cityfix_db::models::page::Page;
use cityfix_db::models::user::{UpdateProfile, User};
use cityfix_db::repositories::UserRepo;
use cityfix_db::store;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users
///
/// List or search users with normalized filters: `search` fans out over
/// profession, location, name, and email; `account_type` and the other
/// allow-listed fields conjoin with it. Unknown keys are a 400.
pub async fn list_users(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> AppResult<Json<DataResponse<Page<User>>>> {
    let spec = state.normalizer.normalize(&raw, QueryEntity::Users)?;
    let page = store::read(state.store_timeout(), || {
        UserRepo::list(&state.pool, &spec)
    })
    .await?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/users/me
pub async fn my_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = store::read(state.store_timeout(), || {
        UserRepo::find_by_id(&state.pool, auth.user_id)
    })
    .await?
    .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;

    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/v1/users/me
///
/// Patch the caller's profile. Email is immutable here; the completeness
/// flag is derived inside the update itself. Coordinates must arrive as a
/// valid pair.
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<User>>> {
    match (input.latitude, input.longitude) {
        (None, None) => {}
        (Some(lat), Some(lng)) => {
            GeoPoint::validate(lat, lng)?;
        }
        _ => {
            return Err(AppError::Core(CoreError::Validation(
                "latitude and longitude must be provided together".into(),
            )))
        }
    }

    let updated = store::write(
        state.store_timeout(),
        UserRepo::update_profile(&state.pool, auth.user_id, &input),
    )
    .await?
    .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;

    Ok(Json(DataResponse { data: updated }))
}

/// GET /api/v1/users/me/referrals
///
/// The identities the calling marketer has referred.
pub async fn my_referrals(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<DbId>>>> {
    let referred = store::read(state.store_timeout(), || {
        UserRepo::referred_ids(&state.pool, auth.user_id)
    })
    .await?
    .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;

    Ok(Json(DataResponse { data: referred }))
}
