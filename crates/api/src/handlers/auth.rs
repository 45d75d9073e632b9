//! Handlers for `/auth`: signup and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use cityfix_core::error::CoreError;
use cityfix_core::profile::{is_profile_complete, RequiredProfileFields};
use cityfix_core::roles::{is_signup_account_type, ACCOUNT_CONSUMER};
use cityfix_core::types::DbId;
use cityfix_db::models::user::{CreateUser, User};
use cityfix_db::repositories::{ReferralRepo, UserRepo};
use cityfix_db::store;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::notifications::send_detached;
use crate::response::DataResponse;
use crate::state::AppState;

/// Signup payload. Profile fields are optional; providing all required ones
/// up front yields an immediately matchable provider profile.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub phone_number: Option<String>,
    pub password: String,
    /// `User` (default) or `CityBuilder`. Marketer accounts are minted by
    /// an admin, never self-selected.
    pub account_type: Option<String>,
    /// Referrer id from a marketer's referral link, if any.
    pub referral_id: Option<DbId>,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub identity_document: Option<String>,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued on a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: DbId,
    pub account_type: String,
}

/// POST /api/v1/auth/signup
///
/// Creates the account, then attributes the referral (best-effort) and
/// dispatches the welcome email (fire-and-forget). Neither of those two can
/// fail the signup.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;
    validate_password_strength(&input.password).map_err(CoreError::Validation)?;

    let account_type = input
        .account_type
        .clone()
        .unwrap_or_else(|| ACCOUNT_CONSUMER.to_string());
    if !is_signup_account_type(&account_type) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Cannot sign up with account type '{account_type}'"
        ))));
    }

    let timeout = state.store_timeout();

    if store::read(timeout, || UserRepo::email_exists(&state.pool, &input.email)).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }
    if let Some(phone) = input.phone_number.as_deref() {
        if store::read(timeout, || UserRepo::phone_exists(&state.pool, phone)).await? {
            return Err(AppError::Core(CoreError::Conflict(
                "An account with this phone number already exists".into(),
            )));
        }
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let profile_complete = is_profile_complete(&RequiredProfileFields {
        state: input.state.as_deref(),
        locality: input.locality.as_deref(),
        profession: input.profession.as_deref(),
        identity_document: input.identity_document.as_deref(),
    });

    let create = CreateUser {
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        phone_number: input.phone_number,
        password_hash,
        account_type,
        profession: input.profession,
        location: input.location,
        state: input.state,
        locality: input.locality,
        identity_document: input.identity_document,
    };

    let user = store::write(timeout, UserRepo::create(&state.pool, &create, profile_complete))
        .await?;

    // Referral attribution is best-effort: failure is logged and swallowed,
    // never surfaced to the new account.
    if let Some(referrer_id) = input.referral_id {
        match store::write(
            timeout,
            ReferralRepo::record_referral(&state.pool, referrer_id, user.id),
        )
        .await
        {
            Ok(true) => {
                tracing::info!(referrer_id, new_user_id = user.id, "Referral recorded");
            }
            Ok(false) => {
                tracing::warn!(
                    referrer_id,
                    new_user_id = user.id,
                    "Referral skipped: referrer missing, not a marketer, or already credited"
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, referrer_id, "Referral skipped: store error");
            }
        }
    }

    send_detached(
        state.mailer.clone(),
        user.email.clone(),
        "Welcome to CityFix".to_string(),
        format!(
            "Hi {},\n\nYour CityFix account has been created.\n",
            user.first_name
        ),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: user }),
    ))
}

/// POST /api/v1/auth/login
///
/// Verifies credentials and issues an access token. Disabled and
/// soft-deleted accounts are rejected; the error never reveals which check
/// failed.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let record = store::read(state.store_timeout(), || {
        UserRepo::find_auth_by_email(&state.pool, &input.email)
    })
    .await?
    .ok_or_else(invalid)?;

    let hash = record.password_hash.as_deref().ok_or_else(invalid)?;
    let verified = verify_password(&input.password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !verified {
        return Err(invalid());
    }

    if record.status == "Disabled" {
        return Err(AppError::Core(CoreError::Unauthorized(
            "This account has been disabled".into(),
        )));
    }

    let token = generate_access_token(record.id, &record.account_type, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token: token,
            user_id: record.id,
            account_type: record.account_type,
        },
    }))
}
