//! User entity models and DTOs.

use cityfix_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table, minus the credential hash.
///
/// This is the projection used by every list, search, and match query; the
/// hash only travels through [`AuthRecord`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub account_type: String,
    pub status: String,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub identity_document: Option<String>,
    pub about: Option<String>,
    pub years_of_experience: Option<i32>,
    pub profile_complete: bool,
    pub sub_expires_at: Option<Timestamp>,
    pub referral_link: Option<String>,
    pub referral_count: i32,
    pub referred_user_ids: Vec<DbId>,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Credential projection for login. The only query shape allowed to read
/// `password_hash`.
#[derive(Debug, Clone, FromRow)]
pub struct AuthRecord {
    pub id: DbId,
    pub email: String,
    pub password_hash: Option<String>,
    pub account_type: String,
    pub status: String,
}

/// A geo-match result: a provider row plus its computed distance from the
/// query origin.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MatchedProvider {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: User,
    /// Great-circle distance from the query origin, in meters.
    pub distance_meters: f64,
}

/// Insert payload for signup. The password arrives here already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub account_type: String,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub identity_document: Option<String>,
}

/// Patch payload for profile updates. Only non-`None` fields are applied;
/// `profile_complete` is derived in the UPDATE itself and is deliberately
/// absent here.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub identity_document: Option<String>,
    pub about: Option<String>,
    pub years_of_experience: Option<i32>,
}
