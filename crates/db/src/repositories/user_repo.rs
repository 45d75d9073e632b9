//! Repository for the `users` table.

use sqlx::PgPool;

use cityfix_core::query::QuerySpec;
use cityfix_core::types::DbId;

use crate::models::page::Page;
use crate::models::user::{AuthRecord, CreateUser, UpdateProfile, User};

use super::filter_sql::compile_filters;

/// Column list shared across queries. Deliberately excludes
/// `password_hash`: list and search projections never carry the credential
/// hash.
pub(crate) const COLUMNS: &str = "id, first_name, last_name, email, phone_number, account_type, \
    status, profession, location, state, locality, address, latitude, longitude, \
    identity_document, about, years_of_experience, profile_complete, sub_expires_at, \
    referral_link, referral_count, referred_user_ids, is_verified, created_at, updated_at";

/// Provides account and profile operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// `profile_complete` is derived by the caller from the insert payload
    /// (see `cityfix_core::profile`), not accepted from the client.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUser,
        profile_complete: bool,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users \
                 (first_name, last_name, email, phone_number, password_hash, account_type, \
                  profession, location, state, locality, identity_document, profile_complete) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone_number)
            .bind(&input.password_hash)
            .bind(&input.account_type)
            .bind(&input.profession)
            .bind(&input.location)
            .bind(&input.state)
            .bind(&input.locality)
            .bind(&input.identity_document)
            .bind(profile_complete)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive, emails are stored unique).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the credential projection for login.
    pub async fn find_auth_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<AuthRecord>, sqlx::Error> {
        sqlx::query_as::<_, AuthRecord>(
            "SELECT id, email, password_hash, account_type, status \
             FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Check whether an email is already registered.
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1))")
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Check whether a phone number is already registered.
    pub async fn phone_exists(pool: &PgPool, phone_number: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE phone_number = $1)")
            .bind(phone_number)
            .fetch_one(pool)
            .await
    }

    /// Execute a normalized query spec against the users collection.
    ///
    /// Fetches one row past the limit so the page can report `has_more`;
    /// ties on the sort field are broken by `id` so repeated calls over an
    /// unchanged dataset paginate deterministically.
    pub async fn list(pool: &PgPool, spec: &QuerySpec) -> Result<Page<User>, sqlx::Error> {
        let compiled = compile_filters(&spec.filters, 1);
        let limit_idx = compiled.values.len() + 1;
        let offset_idx = limit_idx + 1;

        let query = format!(
            "SELECT {COLUMNS} FROM users {where_clause} \
             ORDER BY {sort} {dir}, id ASC \
             LIMIT ${limit_idx} OFFSET ${offset_idx}",
            where_clause = compiled.where_clause(),
            sort = spec.sort_field,
            dir = spec.sort_direction.sql(),
        );

        let mut q = sqlx::query_as::<_, User>(&query);
        for value in &compiled.values {
            q = q.bind(value.as_str());
        }
        let rows = q
            .bind(spec.limit + 1)
            .bind(spec.skip)
            .fetch_all(pool)
            .await?;

        Ok(Page::from_overfetch(rows, spec.limit))
    }

    /// Patch a user's profile. Only non-`None` fields in `input` are
    /// applied.
    ///
    /// `profile_complete` is recomputed inside the same UPDATE from the
    /// post-update values of the required field set, so the flag can never
    /// drift from the data and is never client-settable. Mirrors
    /// `cityfix_core::profile::is_profile_complete`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                phone_number = COALESCE($4, phone_number), \
                profession = COALESCE($5, profession), \
                location = COALESCE($6, location), \
                state = COALESCE($7, state), \
                locality = COALESCE($8, locality), \
                address = COALESCE($9, address), \
                latitude = COALESCE($10, latitude), \
                longitude = COALESCE($11, longitude), \
                identity_document = COALESCE($12, identity_document), \
                about = COALESCE($13, about), \
                years_of_experience = COALESCE($14, years_of_experience), \
                profile_complete = ( \
                    btrim(COALESCE($7, state, '')) <> '' AND \
                    btrim(COALESCE($8, locality, '')) <> '' AND \
                    btrim(COALESCE($5, profession, '')) <> '' AND \
                    btrim(COALESCE($12, identity_document, '')) <> ''), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.phone_number)
            .bind(&input.profession)
            .bind(&input.location)
            .bind(&input.state)
            .bind(&input.locality)
            .bind(&input.address)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.identity_document)
            .bind(&input.about)
            .bind(input.years_of_experience)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the identities a user has referred.
    ///
    /// Returns `None` if the user does not exist.
    pub async fn referred_ids(pool: &PgPool, id: DbId) -> Result<Option<Vec<DbId>>, sqlx::Error> {
        sqlx::query_scalar("SELECT referred_user_ids FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
