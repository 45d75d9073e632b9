//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

mod filter_sql;

pub mod conversation_repo;
pub mod match_repo;
pub mod referral_repo;
pub mod user_repo;

pub use conversation_repo::ConversationRepo;
pub use match_repo::MatchRepo;
pub use referral_repo::ReferralRepo;
pub use user_repo::UserRepo;
