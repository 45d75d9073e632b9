//! Administrative handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use cityfix_core::error::CoreError;
use cityfix_core::referral::{can_issue_link, link_state, referral_link_for};
use cityfix_db::models::user::User;
use cityfix_db::repositories::{ReferralRepo, UserRepo};
use cityfix_db::store;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /admin/marketers`: the account to convert.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMarketer {
    #[validate(email)]
    pub email: String,
}

/// POST /api/v1/admin/marketers
///
/// Convert an existing account into a marketer by issuing its referral
/// link. Issuance is one-way; a second attempt is a 409. The link is
/// derived deterministically from the user id, and the unique index on the
/// column guards concurrent issuance.
pub async fn create_marketer(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateMarketer>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    auth.require_admin()?;
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    let timeout = state.store_timeout();

    let user = store::read(timeout, || {
        UserRepo::find_by_email(&state.pool, &input.email)
    })
    .await?
    .ok_or_else(|| CoreError::NotFound {
        entity: "User",
        key: input.email.clone(),
    })?;

    if !can_issue_link(link_state(user.referral_link.as_deref())) {
        return Err(AppError::Core(CoreError::Conflict(
            "Referral link already issued for this account".into(),
        )));
    }

    let link = referral_link_for(user.id);
    let updated = store::write(
        timeout,
        ReferralRepo::issue_link(&state.pool, user.id, &link),
    )
    .await?
    // Lost the race with a concurrent issuance.
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Referral link already issued for this account".into(),
        ))
    })?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: updated }),
    ))
}
