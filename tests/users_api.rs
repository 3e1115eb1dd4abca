mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn create_user_returns_201_and_stores_a_hash() {
    let t = TestApp::new();
    let (status, body) = t
        .post("/users", json!({ "name": "Ana", "email": "a@x.com", "password": "secret" }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ana");
    assert_eq!(body["email"], "a@x.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let stored = t.state.users.get_by_email("a@x.com").await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "secret");
    assert!(stored.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn create_user_requires_all_fields() {
    let t = TestApp::new();
    for body in [
        json!({ "email": "a@x.com", "password": "secret" }),
        json!({ "name": "Ana", "password": "secret" }),
        json!({ "name": "Ana", "email": "a@x.com" }),
        json!({ "name": "", "email": "a@x.com", "password": "secret" }),
    ] {
        let (status, resp) = t.post("/users", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["message"], "name, email and password are required");
    }
}

#[tokio::test]
async fn create_user_rejects_malformed_json_with_400() {
    let t = TestApp::new();
    let (status, resp) = t.post("/users", json!("just a string")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["message"].is_string());
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let t = TestApp::new();
    t.create_ana().await;
    let (status, _) = t
        .post("/users", json!({ "name": "Other", "email": "A@X.com", "password": "pw" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn ana_example_flow() {
    let t = TestApp::new();
    t.create_ana().await;

    let token = t.login_ana().await;
    assert!(!token.is_empty());

    let (status, body) = t
        .post("/users/login", json!({ "email": "a@x.com", "password": "wrong" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn login_unknown_email_is_404() {
    let t = TestApp::new();
    let (status, _) = t
        .post("/users/login", json!({ "email": "nobody@x.com", "password": "secret" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_requires_email_and_password() {
    let t = TestApp::new();
    let (status, _) = t.post("/users/login", json!({ "email": "a@x.com" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_token_passes_verify_token() {
    let t = TestApp::new();
    let id = t.create_ana().await;
    let token = t.login_ana().await;

    let (status, body) = t.post("/verify-token", json!({ "token": token })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["decoded"]["id"], id);

    // same handler under the users prefix
    let (status, _) = t.post("/users/verify-token", json!({ "token": token })).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn verify_token_rejects_garbage_and_missing() {
    let t = TestApp::new();
    let (status, body) = t.post("/verify-token", json!({ "token": "abc.def.ghi" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "valid": false }));

    let (status, _) = t.post("/verify-token", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_users_lists_all_or_filters_by_email() {
    let t = TestApp::new();
    t.create_ana().await;
    t.post("/users", json!({ "name": "Bia", "email": "b@x.com", "password": "pw" }))
        .await;

    let (status, body) = t.get("/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = t.get("/users?email=b@x.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Bia");

    let (status, _) = t.get("/users?email=c@x.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_user_unknown_is_404_known_is_200() {
    let t = TestApp::new();
    let (status, _) = t.put("/users/999", json!({ "name": "Ghost" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = t.create_ana().await;
    let (status, body) = t
        .put(
            &format!("/users/{}", id),
            json!({ "name": "Ana Maria", "image": "/uploads/users/ana.png" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ana Maria");
    assert_eq!(body["image"], "/uploads/users/ana.png");
    assert_eq!(body["email"], "a@x.com");

    let (_, body) = t.get(&format!("/users/{}", id)).await;
    assert_eq!(body["name"], "Ana Maria");
}

#[tokio::test]
async fn blank_image_on_update_keeps_existing_path() {
    let t = TestApp::new();
    let id = t.create_ana().await;
    let uri = format!("/users/{}", id);
    let (status, _) = t.put(&uri, json!({ "image": "/uploads/users/x.png" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t.put(&uri, json!({ "image": "" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image"], "/uploads/users/x.png");

    let stored = t.state.users.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.image.as_deref(), Some("/uploads/users/x.png"));
}

#[tokio::test]
async fn update_user_password_is_rehashed() {
    let t = TestApp::new();
    let id = t.create_ana().await;
    let (status, _) = t
        .put(&format!("/users/{}", id), json!({ "password": "new-secret" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let stored = t.state.users.get_by_id(id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "new-secret");

    let (status, _) = t
        .post("/users/login", json!({ "email": "a@x.com", "password": "new-secret" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn update_user_rejects_bad_id() {
    let t = TestApp::new();
    let (status, _) = t.put("/users/abc", json!({ "name": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_twice_is_204_then_404() {
    let t = TestApp::new();
    let id = t.create_ana().await;
    let uri = format!("/users/{}", id);

    let (status, body) = t.delete(&uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = t.delete(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn me_requires_a_valid_bearer_token() {
    let t = TestApp::new();
    let (status, _) = t.get("/users/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t
        .request(Method::GET, "/users/me", None, Some("not-a-token"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    t.create_ana().await;
    let token = t.login_ana().await;
    let (status, body) = t
        .request(Method::GET, "/users/me", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@x.com");
}

#[tokio::test]
async fn health_is_ok() {
    let t = TestApp::new();
    let (status, body) = t.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}
