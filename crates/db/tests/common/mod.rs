//! Shared fixtures for repository integration tests.

use sqlx::PgPool;

use cityfix_core::roles::ACCOUNT_PROVIDER;
use cityfix_core::types::DbId;
use cityfix_db::models::user::{CreateUser, UpdateProfile, User};
use cityfix_db::repositories::UserRepo;

pub fn create_input(first_name: &str, email: &str, account_type: &str) -> CreateUser {
    CreateUser {
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        email: email.to_string(),
        phone_number: None,
        password_hash: "$argon2id$stub".to_string(),
        account_type: account_type.to_string(),
        profession: None,
        location: None,
        state: None,
        locality: None,
        identity_document: None,
    }
}

pub async fn seed_user(pool: &PgPool, first_name: &str, email: &str, account_type: &str) -> User {
    UserRepo::create(pool, &create_input(first_name, email, account_type), false)
        .await
        .expect("seed user")
}

/// Seed a matchable provider: complete profile and stored coordinates.
///
/// Goes through `update_profile` so the completeness flag is derived the
/// same way production writes derive it.
pub async fn seed_provider(
    pool: &PgPool,
    first_name: &str,
    email: &str,
    lat: f64,
    lng: f64,
    profession: &str,
) -> User {
    let user = seed_user(pool, first_name, email, ACCOUNT_PROVIDER).await;
    let patch = UpdateProfile {
        profession: Some(profession.to_string()),
        location: Some("Lagos".to_string()),
        state: Some("Lagos".to_string()),
        locality: Some("Ikeja".to_string()),
        identity_document: Some(format!("nin-{}", user.id)),
        latitude: Some(lat),
        longitude: Some(lng),
        ..Default::default()
    };
    UserRepo::update_profile(pool, user.id, &patch)
        .await
        .expect("update profile")
        .expect("provider exists")
}

/// Give a user a subscription expiring `days` from the database clock
/// (negative for already expired).
pub async fn set_subscription_days(pool: &PgPool, user_id: DbId, days: i32) {
    sqlx::query("UPDATE users SET sub_expires_at = NOW() + make_interval(days => $2) WHERE id = $1")
        .bind(user_id)
        .bind(days)
        .execute(pool)
        .await
        .expect("set subscription");
}
