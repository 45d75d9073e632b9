//! Conversation entity model.

use cityfix_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `conversations` table.
///
/// The pair is stored canonicalized (`party_one_id < party_two_id`), so one
/// row represents the unordered pair.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Conversation {
    pub id: DbId,
    pub party_one_id: DbId,
    pub party_two_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub last_activity_at: Timestamp,
}
