//! The client cache against a live server.

#![allow(clippy::unwrap_used)]

use flowrite_client::ClientStore;
use flowrite_core::{CustomerInput, LineItemOrder};
use flowrite_integration_tests::{TestServer, date, submission};

#[tokio::test]
async fn test_cache_follows_server_after_each_mutation() {
    let server = TestServer::spawn().await.unwrap();
    let mut store = ClientStore::new(server.client().unwrap());
    store.register("sync@example.com", "hunter22").await.unwrap();
    assert!(store.customers().is_empty());

    let acme = store
        .create_customer(&CustomerInput {
            name: Some("Acme".into()),
            phone: Some("555-0100".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(store.customers().len(), 1);

    store
        .create_submission(&submission("Acme", "2024-01-01", "09:00 AM", 100.0))
        .await
        .unwrap();
    store
        .create_submission(&submission("Acme", "2024-01-15", "10:00 AM", 250.0))
        .await
        .unwrap();
    assert_eq!(store.submissions().len(), 2);
    assert_eq!(store.submissions()[0].date, date("2024-01-15"));

    let local = store
        .docket("Acme", date("2024-01-01"), date("2024-01-31"), LineItemOrder::Chronological)
        .unwrap();
    let remote = store
        .api()
        .docket("Acme", date("2024-01-01"), date("2024-01-31"), LineItemOrder::Chronological)
        .await
        .unwrap();
    assert_eq!(local.total, remote.total);
    assert_eq!(local.line_items, remote.line_items);
    assert_eq!(local.customer_contact, remote.customer_contact);

    assert_eq!(store.delete_customer(acme.id, true).await.unwrap(), 2);
    assert!(store.customers().is_empty());
    assert!(store.submissions().is_empty());
}

#[tokio::test]
async fn test_failed_mutation_reports_server_message() {
    let server = TestServer::spawn().await.unwrap();
    let mut store = ClientStore::new(server.client().unwrap());
    store.register("sync@example.com", "hunter22").await.unwrap();

    let err = store
        .create_customer(&CustomerInput::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(store.customers().is_empty());
}
