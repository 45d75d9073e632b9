//! Repository for the `conversations` table.

use sqlx::PgPool;

use cityfix_core::conversation::{STATUS_NOT_VIEWED, STATUS_VIEWED};
use cityfix_core::query::QuerySpec;
use cityfix_core::types::DbId;

use crate::models::conversation::Conversation;
use crate::models::page::Page;

use super::filter_sql::compile_filters;

/// Column list for `conversations` queries.
const COLUMNS: &str = "id, party_one_id, party_two_id, status, created_at, last_activity_at";

/// Provides the conversation index operations.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Find-or-create the thread for a canonicalized pair and record
    /// activity on it.
    ///
    /// A single upsert keyed on the unique pair index, so concurrent
    /// first-contact requests resolve to one row. New activity resets the
    /// view state and bumps `last_activity_at`, which re-sorts the
    /// participants' conversation lists.
    ///
    /// `pair` must come from `cityfix_core::conversation::canonical_pair`;
    /// the schema CHECK rejects anything else.
    pub async fn upsert(pool: &PgPool, pair: (DbId, DbId)) -> Result<Conversation, sqlx::Error> {
        let query = format!(
            "INSERT INTO conversations (party_one_id, party_two_id) \
             VALUES ($1, $2) \
             ON CONFLICT (party_one_id, party_two_id) \
             DO UPDATE SET status = $3, last_activity_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(pair.0)
            .bind(pair.1)
            .bind(STATUS_NOT_VIEWED)
            .fetch_one(pool)
            .await
    }

    /// Find a conversation by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM conversations WHERE id = $1");
        sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a conversation as viewed.
    ///
    /// Idempotent: marking an already-viewed conversation succeeds. Returns
    /// `false` only when no row with the given `id` exists.
    pub async fn mark_viewed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE conversations SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(STATUS_VIEWED)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List conversations where `party` is either participant.
    ///
    /// Sorted by the spec's sort field (default `last_activity_at`
    /// descending) with `id` as tie-break for stable pagination.
    pub async fn list_for_party(
        pool: &PgPool,
        party: DbId,
        spec: &QuerySpec,
    ) -> Result<Page<Conversation>, sqlx::Error> {
        let compiled = compile_filters(&spec.filters, 2);
        let limit_idx = 2 + compiled.values.len();
        let offset_idx = limit_idx + 1;

        let query = format!(
            "SELECT {COLUMNS} FROM conversations \
             WHERE (party_one_id = $1 OR party_two_id = $1) \
             {filter_clause} \
             ORDER BY {sort} {dir}, id ASC \
             LIMIT ${limit_idx} OFFSET ${offset_idx}",
            filter_clause = compiled.and_clause(),
            sort = spec.sort_field,
            dir = spec.sort_direction.sql(),
        );

        let mut q = sqlx::query_as::<_, Conversation>(&query).bind(party);
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
}
