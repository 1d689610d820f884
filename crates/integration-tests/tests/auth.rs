//! Account registration, login and token handling over HTTP.

#![allow(clippy::unwrap_used)]

use flowrite_integration_tests::TestServer;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_register_login_me_resolve_same_account() {
    let server = TestServer::spawn().await.unwrap();

    let mut first = server.client().unwrap();
    let registered = first.register("Owner@Example.com", "hunter22").await.unwrap();
    assert_eq!(registered.email.as_str(), "owner@example.com");

    let mut second = server.client().unwrap();
    let logged_in = second.login("owner@example.com", "hunter22").await.unwrap();
    assert_eq!(logged_in.id, registered.id);

    let me = second.me().await.unwrap();
    assert_eq!(me.id, registered.id);

    server.stop().await;
}

#[tokio::test]
async fn test_duplicate_email_is_case_insensitive() {
    let server = TestServer::spawn().await.unwrap();
    server.account("dup@example.com").await.unwrap();

    let mut again = server.client().unwrap();
    let err = again.register("DUP@example.com", "another1").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("Email already registered"));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let server = TestServer::spawn().await.unwrap();
    server.account("real@example.com").await.unwrap();

    let mut client = server.client().unwrap();
    let wrong = client.login("real@example.com", "nope-nope").await.unwrap_err();
    let unknown = client.login("ghost@example.com", "hunter22").await.unwrap_err();

    assert_eq!(wrong.status(), Some(401));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn test_short_password_lists_field_error() {
    let server = TestServer::spawn().await.unwrap();

    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/register", server.base_url()))
        .json(&serde_json::json!({"email": "short@example.com", "password": "12345"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"][0]["field"], "password");
}

#[tokio::test]
async fn test_protected_routes_need_a_valid_token() {
    let server = TestServer::spawn().await.unwrap();

    let anonymous = server.client().unwrap();
    let err = anonymous.list_customers().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let forged = server.client().unwrap().with_token("not.a.token");
    let err = forged.me().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Token is not valid"));
}

#[tokio::test]
async fn test_health_reports_memory_store() {
    let server = TestServer::spawn().await.unwrap();
    let health = server.client().unwrap().health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.store, "memory");
}
