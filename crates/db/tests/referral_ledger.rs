mod common;

use sqlx::PgPool;

use cityfix_core::referral::referral_link_for;
use cityfix_core::roles::{ACCOUNT_CONSUMER, ACCOUNT_MARKETER};
use cityfix_db::repositories::{ReferralRepo, UserRepo};

use common::seed_user;

async fn seed_marketer(pool: &PgPool, email: &str) -> cityfix_db::models::user::User {
    let user = seed_user(pool, "Moji", email, ACCOUNT_CONSUMER).await;
    ReferralRepo::issue_link(pool, user.id, &referral_link_for(user.id))
        .await
        .unwrap()
        .expect("link issued")
}

#[sqlx::test]
async fn issue_link_converts_the_account_once(pool: PgPool) {
    let user = seed_user(&pool, "Moji", "moji@example.com", ACCOUNT_CONSUMER).await;

    let issued = ReferralRepo::issue_link(&pool, user.id, &referral_link_for(user.id))
        .await
        .unwrap()
        .expect("first issuance succeeds");
    assert_eq!(issued.account_type, ACCOUNT_MARKETER);
    assert_eq!(issued.referral_link.as_deref(), Some(referral_link_for(user.id).as_str()));

    // Issuance is one-way; a second attempt is refused.
    let again = ReferralRepo::issue_link(&pool, user.id, &referral_link_for(user.id))
        .await
        .unwrap();
    assert!(again.is_none());
}

#[sqlx::test]
async fn issue_link_for_missing_user_is_refused(pool: PgPool) {
    let issued = ReferralRepo::issue_link(&pool, 9999, &referral_link_for(9999))
        .await
        .unwrap();
    assert!(issued.is_none());
}

#[sqlx::test]
async fn referral_increments_counter_and_appends_identity(pool: PgPool) {
    let marketer = seed_marketer(&pool, "moji@example.com").await;
    let alice = seed_user(&pool, "Alice", "alice@example.com", ACCOUNT_CONSUMER).await;
    let bob = seed_user(&pool, "Bob", "bob@example.com", ACCOUNT_CONSUMER).await;

    assert!(ReferralRepo::record_referral(&pool, marketer.id, alice.id)
        .await
        .unwrap());
    assert!(ReferralRepo::record_referral(&pool, marketer.id, bob.id)
        .await
        .unwrap());

    let refreshed = UserRepo::find_by_id(&pool, marketer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.referral_count, 2);
    assert_eq!(refreshed.referred_user_ids, vec![alice.id, bob.id]);
}

#[sqlx::test]
async fn concurrent_referrals_lose_no_updates(pool: PgPool) {
    let marketer = seed_marketer(&pool, "moji@example.com").await;
    let alice = seed_user(&pool, "Alice", "alice@example.com", ACCOUNT_CONSUMER).await;
    let bob = seed_user(&pool, "Bob", "bob@example.com", ACCOUNT_CONSUMER).await;

    let (first, second) = tokio::join!(
        ReferralRepo::record_referral(&pool, marketer.id, alice.id),
        ReferralRepo::record_referral(&pool, marketer.id, bob.id),
    );
    assert!(first.unwrap());
    assert!(second.unwrap());

    let refreshed = UserRepo::find_by_id(&pool, marketer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.referral_count, 2);
    assert!(refreshed.referred_user_ids.contains(&alice.id));
    assert!(refreshed.referred_user_ids.contains(&bob.id));
}

#[sqlx::test]
async fn duplicate_referral_for_the_same_user_is_a_no_op(pool: PgPool) {
    let marketer = seed_marketer(&pool, "moji@example.com").await;
    let alice = seed_user(&pool, "Alice", "alice@example.com", ACCOUNT_CONSUMER).await;

    assert!(ReferralRepo::record_referral(&pool, marketer.id, alice.id)
        .await
        .unwrap());
    assert!(!ReferralRepo::record_referral(&pool, marketer.id, alice.id)
        .await
        .unwrap());

    let refreshed = UserRepo::find_by_id(&pool, marketer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.referral_count, 1);
    assert_eq!(refreshed.referred_user_ids, vec![alice.id]);
}

#[sqlx::test]
async fn referral_to_missing_or_non_marketer_referrer_is_skipped(pool: PgPool) {
    let alice = seed_user(&pool, "Alice", "alice@example.com", ACCOUNT_CONSUMER).await;
    let plain = seed_user(&pool, "Paul", "paul@example.com", ACCOUNT_CONSUMER).await;

    // Non-existent referrer: skipped, not an error.
    assert!(!ReferralRepo::record_referral(&pool, 9999, alice.id)
        .await
        .unwrap());

    // Referrer exists but holds no marketer link: also skipped.
    assert!(!ReferralRepo::record_referral(&pool, plain.id, alice.id)
        .await
        .unwrap());

    let refreshed = UserRepo::find_by_id(&pool, plain.id).await.unwrap().unwrap();
    assert_eq!(refreshed.referral_count, 0);
    assert!(refreshed.referred_user_ids.is_empty());
}
