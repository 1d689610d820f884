#![allow(clippy::unwrap_used)]

use flowrite_client::{ApiClient, ClientError};
use flowrite_core::{CustomerId, CustomerInput};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn account_json() -> serde_json::Value {
    json!({
        "id": 7,
        "email": "owner@example.com",
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

fn customer_json(id: i32, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "ownerId": 7,
        "name": name,
        "email": null,
        "phone": null,
        "address": null,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_login_stores_token_and_sends_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "owner@example.com", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful",
            "data": {"token": "tok-123", "user": account_json()}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": account_json()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = ApiClient::new(&server.uri()).unwrap();
    let account = client.login("owner@example.com", "hunter22").await.unwrap();
    assert_eq!(account.email.as_str(), "owner@example.com");
    assert_eq!(client.token(), Some("tok-123"));

    let me = client.me().await.unwrap();
    assert_eq!(me, account);
}

#[tokio::test]
async fn test_error_envelope_becomes_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Invalid email or password"
        })))
        .mount(&server)
        .await;

    let mut client = ApiClient::new(&server.uri()).unwrap();
    let err = client.login("owner@example.com", "wrong-pass").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    match err {
        ClientError::Api { message, .. } => assert_eq!(message, "Invalid email or password"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(client.token(), None);
}

#[tokio::test]
async fn test_non_json_error_uses_reason_phrase() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap().with_token("t");
    let err = client.list_items().await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_customer_name_is_percent_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/submissions/customer/Acme%20Ltd%2FNorth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "2 submission(s) deleted successfully",
            "data": {"deletedCount": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap().with_token("t");
    let removed = client
        .delete_submissions_for_customer("Acme Ltd/North")
        .await
        .unwrap();
    assert_eq!(removed, 2);
}

#[tokio::test]
async fn test_delete_customer_sends_cascade_flag() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/customers/4"))
        .and(query_param("cascade", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Customer deleted successfully",
            "data": {"deletedSubmissions": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap().with_token("t");
    let removed = client.delete_customer(CustomerId::new(4), true).await.unwrap();
    assert_eq!(removed, 3);
}

#[tokio::test]
async fn test_list_pages_until_short_page() {
    let server = MockServer::start().await;

    let full: Vec<_> = (1..=1000).map(|i| customer_json(i, &format!("C{i:04}"))).collect();
    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "1000"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": full})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .and(query_param("offset", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [customer_json(1001, "Zed")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap().with_token("t");
    let customers = client.list_customers().await.unwrap();
    assert_eq!(customers.len(), 1001);
    assert_eq!(customers[1000].name, "Zed");
}

#[tokio::test]
async fn test_create_customer_returns_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/customers"))
        .and(body_json(json!({"name": "Acme", "email": null, "phone": null, "address": null})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "Customer created successfully",
            "data": customer_json(1, "Acme")
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap().with_token("t");
    let input = CustomerInput {
        name: Some("Acme".into()),
        ..Default::default()
    };
    let customer = client.create_customer(&input).await.unwrap();
    assert_eq!(customer.id, CustomerId::new(1));
}

#[tokio::test]
async fn test_success_without_data_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/submissions/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap().with_token("t");
    assert!(matches!(
        client.submission_stats().await,
        Err(ClientError::MissingData)
    ));
}
