//! Submissions, stats, date ranges and dockets over HTTP.

#![allow(clippy::unwrap_used)]

use flowrite_core::{CustomerInput, LineItemOrder, SubmissionStats};
use flowrite_integration_tests::{TestServer, date, submission};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_fresh_account_stats_are_zero() {
    let server = TestServer::spawn().await.unwrap();
    let client = server.account("fresh@example.com").await.unwrap();

    let stats = client.submission_stats().await.unwrap();
    assert_eq!(stats, SubmissionStats::default());
}

#[tokio::test]
async fn test_acme_scenario() {
    let server = TestServer::spawn().await.unwrap();
    let client = server.account("yard@example.com").await.unwrap();

    client
        .create_submission(&submission("Acme", "2024-01-01", "09:00 AM", 100.0))
        .await
        .unwrap();
    client
        .create_submission(&submission("Acme", "2024-01-15", "02:30 PM", 250.0))
        .await
        .unwrap();

    let stats = client.submission_stats().await.unwrap();
    assert_eq!(stats.total_submissions, 2);
    assert_eq!(stats.total_amount, "350".parse().unwrap());
    assert_eq!(stats.unique_customers, 1);

    let range = client
        .submissions_in_range(date("2024-01-01"), date("2024-01-15"))
        .await
        .unwrap();
    assert_eq!(range.len(), 2);
    assert_eq!(range[0].date, date("2024-01-15"));

    let docket = client
        .docket(
            "Acme",
            date("2024-01-01"),
            date("2024-01-31"),
            LineItemOrder::Chronological,
        )
        .await
        .unwrap();
    assert_eq!(docket.total, "350".parse().unwrap());
    assert_eq!(docket.line_items.len(), 2);
    assert_eq!(docket.line_items[0].date, date("2024-01-01"));
    assert!(docket.docket_number.starts_with('D'));

    let newest_first = client
        .docket(
            "Acme",
            date("2024-01-01"),
            date("2024-01-31"),
            LineItemOrder::MostRecentFirst,
        )
        .await
        .unwrap();
    assert_eq!(newest_first.line_items[0].date, date("2024-01-15"));
    assert_ne!(newest_first.docket_number, docket.docket_number);

    assert_eq!(client.delete_submissions_for_customer("Acme").await.unwrap(), 2);
    assert!(client.list_submissions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_date_range_bounds() {
    let server = TestServer::spawn().await.unwrap();
    let client = server.account("range@example.com").await.unwrap();

    for day in ["2024-03-01", "2024-03-10", "2024-03-20"] {
        client
            .create_submission(&submission("Bolt", day, "08:00 AM", 10.0))
            .await
            .unwrap();
    }

    let inclusive = client
        .submissions_in_range(date("2024-03-01"), date("2024-03-10"))
        .await
        .unwrap();
    assert_eq!(inclusive.len(), 2);

    let empty = client
        .submissions_in_range(date("2025-01-01"), date("2025-12-31"))
        .await
        .unwrap();
    assert!(empty.is_empty());

    let reversed = client
        .submissions_in_range(date("2024-03-20"), date("2024-03-01"))
        .await
        .unwrap();
    assert!(reversed.is_empty());
}

#[tokio::test]
async fn test_date_range_rejects_bad_bounds() {
    let server = TestServer::spawn().await.unwrap();
    let client = server.account("range@example.com").await.unwrap();
    let token = client.token().unwrap().to_owned();
    let http = reqwest::Client::new();

    for query in ["startDate=2024-01-01", "startDate=2024-13-01&endDate=2024-01-31"] {
        let response = http
            .get(format!(
                "{}/api/submissions/date-range?{query}",
                server.base_url()
            ))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{query}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_docket_without_matches_is_not_found() {
    let server = TestServer::spawn().await.unwrap();
    let client = server.account("docket@example.com").await.unwrap();
    client
        .create_submission(&submission("Acme", "2024-01-01", "09:00 AM", 100.0))
        .await
        .unwrap();

    let err = client
        .docket(
            "Nobody",
            date("2024-01-01"),
            date("2024-01-31"),
            LineItemOrder::Chronological,
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("No submissions found"));
}

#[tokio::test]
async fn test_docket_total_is_exact_decimal_sum() {
    let server = TestServer::spawn().await.unwrap();
    let client = server.account("cents@example.com").await.unwrap();

    for amount in [0.1, 0.2, 0.7] {
        client
            .create_submission(&submission("Cents", "2024-02-01", "09:00 AM", amount))
            .await
            .unwrap();
    }

    let docket = client
        .docket(
            "Cents",
            date("2024-02-01"),
            date("2024-02-01"),
            LineItemOrder::Chronological,
        )
        .await
        .unwrap();
    assert_eq!(docket.total, "1".parse().unwrap());
}

#[tokio::test]
async fn test_customer_delete_keeps_submissions_unless_cascading() {
    let server = TestServer::spawn().await.unwrap();
    let client = server.account("cascade@example.com").await.unwrap();

    let acme = client
        .create_customer(&CustomerInput {
            name: Some("Acme".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    client
        .create_submission(&submission("Acme", "2024-01-01", "09:00 AM", 100.0))
        .await
        .unwrap();

    assert_eq!(client.delete_customer(acme.id, false).await.unwrap(), 0);
    let kept = client.submissions_for_customer("Acme").await.unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].customer_id, None);

    let bolt = client
        .create_customer(&CustomerInput {
            name: Some("Bolt".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let linked = client
        .create_submission(&submission("Bolt", "2024-01-02", "09:00 AM", 50.0))
        .await
        .unwrap();
    assert_eq!(linked.customer_id, Some(bolt.id));

    assert_eq!(client.delete_customer(bolt.id, true).await.unwrap(), 1);
    assert!(client.submissions_for_customer("Bolt").await.unwrap().is_empty());
    assert_eq!(client.list_submissions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_print_docket_is_html() {
    let server = TestServer::spawn().await.unwrap();
    let client = server.account("print@example.com").await.unwrap();
    client
        .create_submission(&submission("Acme Ltd", "2024-01-01", "09:00 AM", 100.0))
        .await
        .unwrap();

    let response = reqwest::Client::new()
        .get(format!("{}/api/dockets/print", server.base_url()))
        .query(&[
            ("customerName", "Acme Ltd"),
            ("startDate", "2024-01-01"),
            ("endDate", "2024-01-31"),
        ])
        .bearer_auth(client.token().unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"));
    let html = response.text().await.unwrap();
    assert!(html.contains("Acme Ltd"));
    assert!(html.contains("$100.00"));
}
