mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::{bearer, build_test_app};

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_bearer_token_is_401() {
    let app = build_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/providers/nearby?lat=6.5&lng=3.3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn invalid_origin_is_rejected_before_any_store_call() {
    let app = build_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/providers/nearby?lat=91.0&lng=3.3")
                .header("authorization", bearer(1, "User"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("Latitude"));
}

#[tokio::test]
async fn missing_origin_is_a_validation_error_not_an_empty_result() {
    let app = build_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/providers/nearby")
                .header("authorization", bearer(1, "User"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("lat"));
}

#[tokio::test]
async fn unknown_filter_field_is_rejected_with_the_key_named() {
    let app = build_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users?favourite_colour=red")
                .header("authorization", bearer(1, "User"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("favourite_colour"));
}

#[tokio::test]
async fn non_numeric_limit_is_rejected() {
    let app = build_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users?limit=lots")
                .header("authorization", bearer(1, "User"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn conversation_with_self_is_rejected() {
    let app = build_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/conversations")
                .header("authorization", bearer(7, "User"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"party_id": 7}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("distinct"));
}

#[tokio::test]
async fn non_admin_cannot_issue_referral_links() {
    let app = build_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/admin/marketers")
                .header("authorization", bearer(7, "Marketer"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"email": "moji@example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn weak_signup_password_is_rejected() {
    let app = build_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/signup")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"first_name": "Ada", "last_name": "Obi", "email": "ada@example.com", "password": "weak"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Password"));
}
