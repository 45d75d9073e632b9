//! Conversation pair canonicalization and view-state rules.
//!
//! A conversation belongs to an unordered pair of participants. Storing the
//! pair canonicalized (smaller id first) guarantees at most one thread per
//! pair regardless of which side initiates.

use crate::error::CoreError;
use crate::types::DbId;

/// A conversation some participant has opened but not yet read.
pub const STATUS_NOT_VIEWED: &str = "not-viewed";

/// A conversation the participant has read. New activity resets the status
/// back to [`STATUS_NOT_VIEWED`].
pub const STATUS_VIEWED: &str = "viewed";

/// Canonical representation of an unordered participant pair.
///
/// `(A, B)` and `(B, A)` map to the same value. A self-pair is rejected.
pub fn canonical_pair(a: DbId, b: DbId) -> Result<(DbId, DbId), CoreError> {
    if a == b {
        return Err(CoreError::Validation(
            "A conversation needs two distinct participants".into(),
        ));
    }
    Ok(if a < b { (a, b) } else { (b, a) })
}

/// Whether `party` participates in the conversation stored as `(one, two)`.
pub fn is_participant(party: DbId, one: DbId, two: DbId) -> bool {
    party == one || party == two
}
