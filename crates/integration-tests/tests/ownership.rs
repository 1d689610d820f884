//! Tenant isolation between two accounts.

#![allow(clippy::unwrap_used)]

use flowrite_client::ClientError;
use flowrite_core::{CustomerInput, ItemInput};
use flowrite_integration_tests::{TestServer, submission};

fn forbidden(result: Result<(), ClientError>) {
    assert_eq!(result.unwrap_err().status(), Some(403));
}

#[tokio::test]
async fn test_other_accounts_records_are_forbidden() {
    let server = TestServer::spawn().await.unwrap();
    let alice = server.account("alice@example.com").await.unwrap();
    let bob = server.account("bob@example.com").await.unwrap();

    let customer = alice
        .create_customer(&CustomerInput {
            name: Some("Acme".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let sub = alice
        .create_submission(&submission("Acme", "2024-01-01", "09:00 AM", 100.0))
        .await
        .unwrap();
    let item = alice
        .create_item(&ItemInput {
            name: Some("Road Base".into()),
            unit: Some("tonne".into()),
        })
        .await
        .unwrap();

    forbidden(bob.get_customer(customer.id).await.map(|_| ()));
    forbidden(
        bob.update_customer(
            customer.id,
            &CustomerInput {
                name: Some("Mine now".into()),
                ..Default::default()
            },
        )
        .await
        .map(|_| ()),
    );
    forbidden(bob.delete_customer(customer.id, true).await.map(|_| ()));
    forbidden(bob.get_submission(sub.id).await.map(|_| ()));
    forbidden(
        bob.update_submission(sub.id, &submission("Bob", "2024-01-02", "10:00 AM", 1.0))
            .await
            .map(|_| ()),
    );
    forbidden(bob.delete_submission(sub.id).await);
    forbidden(bob.delete_item(item.id).await);

    // Alice's records are untouched.
    assert_eq!(alice.get_customer(customer.id).await.unwrap().name, "Acme");
    assert_eq!(alice.get_submission(sub.id).await.unwrap().customer_name, "Acme");
    assert_eq!(alice.list_items().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_listings_only_show_own_records() {
    let server = TestServer::spawn().await.unwrap();
    let alice = server.account("alice@example.com").await.unwrap();
    let bob = server.account("bob@example.com").await.unwrap();

    alice
        .create_submission(&submission("Acme", "2024-01-01", "09:00 AM", 100.0))
        .await
        .unwrap();

    assert!(bob.list_submissions().await.unwrap().is_empty());
    assert!(bob.submissions_for_customer("Acme").await.unwrap().is_empty());
    assert_eq!(bob.delete_submissions_for_customer("Acme").await.unwrap(), 0);
    assert_eq!(alice.list_submissions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let server = TestServer::spawn().await.unwrap();
    let alice = server.account("alice@example.com").await.unwrap();

    let err = alice
        .get_customer(flowrite_core::CustomerId::new(9999))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}
