mod common;

use std::collections::HashMap;

use sqlx::PgPool;

use cityfix_core::query::{QueryConfig, QueryEntity, QueryNormalizer, MAX_PAGE_SIZE};
use cityfix_db::models::user::UpdateProfile;
use cityfix_db::repositories::UserRepo;

use common::{seed_provider, seed_user};

fn normalize(pairs: &[(&str, &str)]) -> cityfix_core::query::QuerySpec {
    let raw: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    QueryNormalizer::new(QueryConfig::default())
        .normalize(&raw, QueryEntity::Users)
        .unwrap()
}

#[sqlx::test]
async fn search_with_role_filter_returns_clamped_matching_page(pool: PgPool) {
    for i in 0..60 {
        seed_provider(
            &pool,
            &format!("Plumber{i}"),
            &format!("plumber{i}@example.com"),
            6.5,
            3.3,
            "Plumber",
        )
        .await;
    }
    seed_provider(&pool, "Volt", "volt@example.com", 6.5, 3.3, "Electrician").await;
    seed_user(&pool, "Pat", "pat-the-plumber@example.com", "User").await;

    // A requested limit of 500 is clamped to the page-size ceiling.
    let spec = normalize(&[
        ("search", "plumber"),
        ("account_type", "CityBuilder"),
        ("limit", "500"),
    ]);
    let page = UserRepo::list(&pool, &spec).await.unwrap();

    assert_eq!(page.items.len() as i64, MAX_PAGE_SIZE);
    assert!(page.has_more);
    for user in &page.items {
        assert_eq!(user.account_type, "CityBuilder");
        let haystack = format!(
            "{} {} {} {} {}",
            user.profession.as_deref().unwrap_or_default(),
            user.location.as_deref().unwrap_or_default(),
            user.first_name,
            user.last_name,
            user.email,
        )
        .to_lowercase();
        assert!(haystack.contains("plumber"));
    }
}

#[sqlx::test]
async fn repeated_listings_of_an_unchanged_dataset_are_identical(pool: PgPool) {
    for i in 0..10 {
        seed_user(&pool, &format!("U{i}"), &format!("u{i}@example.com"), "User").await;
    }
    // Collapse the sort key so only the id tie-break orders the page.
    sqlx::query("UPDATE users SET created_at = '2026-01-01T00:00:00Z'")
        .execute(&pool)
        .await
        .unwrap();

    let spec = normalize(&[]);
    let first = UserRepo::list(&pool, &spec).await.unwrap();
    let second = UserRepo::list(&pool, &spec).await.unwrap();

    let first_ids: Vec<_> = first.items.iter().map(|u| u.id).collect();
    let second_ids: Vec<_> = second.items.iter().map(|u| u.id).collect();
    assert_eq!(first_ids, second_ids);

    let mut sorted = first_ids.clone();
    sorted.sort();
    assert_eq!(first_ids, sorted);
}

#[sqlx::test]
async fn empty_result_is_a_page_not_an_error(pool: PgPool) {
    let spec = normalize(&[("search", "nobody-matches-this")]);
    let page = UserRepo::list(&pool, &spec).await.unwrap();
    assert!(page.is_empty());
    assert!(!page.has_more);
}

#[sqlx::test]
async fn profile_completeness_is_derived_on_write(pool: PgPool) {
    let user = seed_user(&pool, "Bayo", "bayo@example.com", "CityBuilder").await;
    assert!(!user.profile_complete);

    // Partial update: still missing the identity document.
    let partial = UpdateProfile {
        profession: Some("Plumber".to_string()),
        state: Some("Lagos".to_string()),
        locality: Some("Ikeja".to_string()),
        ..Default::default()
    };
    let user = UserRepo::update_profile(&pool, user.id, &partial)
        .await
        .unwrap()
        .unwrap();
    assert!(!user.profile_complete);

    // The last required field flips the derived flag.
    let finishing = UpdateProfile {
        identity_document: Some("nin-12345678".to_string()),
        ..Default::default()
    };
    let user = UserRepo::update_profile(&pool, user.id, &finishing)
        .await
        .unwrap()
        .unwrap();
    assert!(user.profile_complete);
}

#[sqlx::test]
async fn update_profile_for_missing_user_returns_none(pool: PgPool) {
    let updated = UserRepo::update_profile(&pool, 9999, &UpdateProfile::default())
        .await
        .unwrap();
    assert!(updated.is_none());
}
