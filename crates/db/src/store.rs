//! Bounded store calls.
//!
//! Every repository call made on behalf of a request runs under a
//! request-scoped deadline, so a stalled connection surfaces as a retryable
//! [`CoreError::StoreTimeout`] instead of hanging the request or being
//! mistaken for an empty result. Reads get one transparent retry; writes
//! never retry -- mutating paths rely on their own idempotency guards.

use std::future::Future;
use std::time::Duration;

use cityfix_core::error::CoreError;

/// Default per-call deadline, used when `STORE_TIMEOUT_MS` is not set.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

fn map_sqlx(err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::PoolTimedOut => CoreError::StoreTimeout,
        // PostgreSQL unique constraint violation: error code 23505.
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ))
        }
        other => CoreError::StoreUnavailable(other.to_string()),
    }
}

/// Run a read-only store call under `timeout`, retrying once on timeout.
///
/// The closure is invoked again for the retry so each attempt gets a fresh
/// future. Only idempotent reads may go through here.
pub async fn read<T, F, Fut>(timeout: Duration, mut op: F) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, op()).await {
        Ok(result) => result.map_err(map_sqlx),
        Err(_elapsed) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Store read timed out, retrying once"
            );
            match tokio::time::timeout(timeout, op()).await {
                Ok(result) => result.map_err(map_sqlx),
                Err(_elapsed) => Err(CoreError::StoreTimeout),
            }
        }
    }
}

/// Run a mutating store call under `timeout`. Never retried.
pub async fn write<T, Fut>(timeout: Duration, op: Fut) -> Result<T, CoreError>
where
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, op).await {
        Ok(result) => result.map_err(map_sqlx),
        Err(_elapsed) => Err(CoreError::StoreTimeout),
    }
}
