mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn register_then_login() {
    let app = TestApp::spawn().await;

    let (status, user) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "alice", "password": "secret-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "alice");
    assert_eq!(user["role"], "user");
    assert!(user.get("password_hash").is_none());

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "alice", "password": "secret-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["expires_in"], 3600);
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let app = TestApp::spawn().await;
    app.login_as("alice", "user").await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "alice", "password": "other" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn bad_credentials_share_one_message() {
    let app = TestApp::spawn().await;
    app.login_as("alice", "user").await;

    let (wrong_status, wrong) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "alice", "password": "nope" }),
        )
        .await;
    let (unknown_status, unknown) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "mallory", "password": "nope" }),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["error"]["message"], unknown["error"]["message"]);
}

#[tokio::test]
async fn protected_routes_check_token_then_role() {
    let app = TestApp::spawn().await;
    let user = app.login_as("bob", "user").await;
    let admin = app.login_as("root", "admin").await;

    let (status, body) = app.get("/api/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _) = app.get("/api/users", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/users", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "insufficient permissions");

    let (status, users) = app.get("/api/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    let (status, _) = app.get("/api/leaders", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/promotions", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_body_is_validation_error() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post("/api/auth/register", None, json!({ "username": 7 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["trace_id"].is_string());
}
