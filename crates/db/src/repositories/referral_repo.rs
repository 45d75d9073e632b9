//! Referral ledger: link issuance and atomic referral accounting.

use sqlx::PgPool;

use cityfix_core::roles::ACCOUNT_MARKETER;
use cityfix_core::types::DbId;

use crate::models::user::User;

use super::user_repo::COLUMNS;

/// Provides the referral ledger mutations.
pub struct ReferralRepo;

impl ReferralRepo {
    /// Issue a marketer referral link. One-way: only succeeds while the
    /// account has no link yet, and converts the account to a marketer in
    /// the same statement.
    ///
    /// Returns `None` when the user is missing or a link was already
    /// issued; the unique index on `referral_link` guards against
    /// collisions from concurrent issuance.
    pub async fn issue_link(
        pool: &PgPool,
        user_id: DbId,
        link: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users \
             SET referral_link = $2, account_type = $3, updated_at = NOW() \
             WHERE id = $1 AND referral_link IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(link)
            .bind(ACCOUNT_MARKETER)
            .fetch_optional(pool)
            .await
    }

    /// Record one confirmed referral: increment the counter and append the
    /// new user's identity in a single statement, so concurrent referral
    /// events for the same referrer cannot lose updates.
    ///
    /// The array-containment guard makes the call idempotent per
    /// (referrer, new user) pair, which is what allows the caller to treat
    /// the whole operation as best-effort.
    ///
    /// Returns `false` when nothing was recorded: referrer missing, not a
    /// marketer, or this user already credited.
    pub async fn record_referral(
        pool: &PgPool,
        referrer_id: DbId,
        new_user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users \
             SET referral_count = referral_count + 1, \
                 referred_user_ids = array_append(referred_user_ids, $2) \
             WHERE id = $1 \
               AND account_type = $3 \
               AND NOT (referred_user_ids @> ARRAY[$2]::bigint[])",
        )
        .bind(referrer_id)
        .bind(new_user_id)
        .bind(ACCOUNT_MARKETER)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
