use std::sync::Arc;
use std::time::Duration;

use cityfix_core::query::QueryNormalizer;

use crate::config::ServerConfig;
use crate::notifications::Mailer;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cityfix_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Query normalizer carrying the immutable tuning constants (page
    /// bounds, match distance ceiling) shared with the geo-matcher.
    pub normalizer: Arc<QueryNormalizer>,
    /// SMTP delivery; `None` when email is not configured.
    pub mailer: Option<Arc<Mailer>>,
}

impl AppState {
    /// The request-scoped deadline applied to every store call.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.config.store_timeout_ms)
    }
}
