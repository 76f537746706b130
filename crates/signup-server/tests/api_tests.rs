//! Integration tests for the sign-up API.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use member_store::{MemberStore, Store};
use serde_json::{json, Value};
use signup_server::api::{create_router, AppState, SignupThrottle};
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app backed by an in-memory store.
fn create_test_app() -> (Router, Arc<Store>) {
    let store = Arc::new(Store::memory());
    let state = AppState::new(store.clone());
    let app = create_router(state, SignupThrottle::relaxed());
    (app, store)
}

fn jane() -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "phone": "+254712345678",
        "dateOfBirth": "2000-01-01",
        "isAlreadyInWhatsapp": "no",
        "shouldInviteToWhatsapp": true,
        "shouldReceiveUpdates": true
    })
}

async fn post_signup(app: &Router, body: &Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/signup")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn get_health(app: &Router) -> StatusCode {
    app.clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["member_count"], 0);
}

#[tokio::test]
async fn test_signup_success() {
    let (app, store) = create_test_app();

    let (status, json) = post_signup(&app, &jane()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "You have been successfully signed up.");
    assert!(json.get("error").is_none());

    let members = store.list().await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].email, "jane@example.com");
    assert_eq!(members[0].phone, "+254712345678");
    assert!(!members[0].invited_to_whatsapp);
    assert!(members[0].should_invite_to_whatsapp);
}

#[tokio::test]
async fn test_signup_twice_is_duplicate() {
    let (app, store) = create_test_app();

    let (status, _) = post_signup(&app, &jane()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = post_signup(&app, &jane()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "DUPLICATE");
    assert_eq!(
        json["error"]["message"],
        "A user with this email or phone number is already registered"
    );

    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_validation_failure_reports_fields() {
    let (app, store) = create_test_app();

    let mut body = jane();
    body["shouldInviteToWhatsapp"] = json!(false);
    body["email"] = json!("not-an-email");

    let (status, json) = post_signup(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VALIDATION");

    let fields: Vec<&str> = json["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "shouldInviteToWhatsapp"]);

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_fields_are_violations() {
    let (app, _) = create_test_app();

    let (status, json) = post_signup(&app, &json!({ "name": "Jane Doe" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["violations"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_malformed_json_is_validation_failure() {
    let (app, store) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/signup")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VALIDATION");
    assert!(json["violations"].as_array().unwrap().is_empty());

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_numeric_phone_is_field_violation() {
    let (app, store) = create_test_app();

    let mut body = jane();
    body["phone"] = json!(254712345678u64);

    let (status, json) = post_signup(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VALIDATION");
    assert_eq!(json["violations"].as_array().unwrap().len(), 1);
    assert_eq!(json["violations"][0]["field"], "phone");

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_string_for_checkbox_is_field_violation() {
    let (app, _) = create_test_app();

    let mut body = jane();
    body["shouldInviteToWhatsapp"] = json!("yes");

    let (status, json) = post_signup(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION");
    assert_eq!(json["violations"].as_array().unwrap().len(), 1);
    assert_eq!(json["violations"][0]["field"], "shouldInviteToWhatsapp");
}

#[tokio::test]
async fn test_rate_limiting() {
    let store = Arc::new(Store::memory());
    let app = create_router(AppState::new(store), SignupThrottle::per_minute(1));

    let (status, _) = post_signup(&app, &jane()).await;
    assert_eq!(status, StatusCode::OK);

    let mut second = jane();
    second["email"] = json!("john@example.com");
    second["phone"] = json!("+254700000000");
    let (status, json) = post_signup(&app, &second).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "UNKNOWN");
}

#[tokio::test]
async fn test_health_is_not_throttled() {
    let store = Arc::new(Store::memory());
    let app = create_router(AppState::new(store), SignupThrottle::per_minute(1));

    for _ in 0..3 {
        assert_eq!(get_health(&app).await, StatusCode::OK);
    }

    let (status, _) = post_signup(&app, &jane()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_signup(&app, &jane()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(get_health(&app).await, StatusCode::OK);
}
