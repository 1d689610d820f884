//! Seed reference data.

use std::collections::HashSet;

use flowrite_core::{Email, ItemInput, Page};
use flowrite_server::db::Store;

use super::{CommandError, connect_store};

/// Catalog every new yard starts from: `(name, unit)`.
pub const DEFAULT_ITEMS: &[(&str, &str)] = &[
    ("10mm Crushed Concrete", "tonne"),
    ("20mm Crushed Concrete", "tonne"),
    ("40mm Crushed Concrete", "tonne"),
    ("Road Base", "tonne"),
    ("Fill Sand", "tonne"),
];

/// Insert the default catalog for the account with `email`, skipping names
/// the account already has.
///
/// # Errors
///
/// Returns `CommandError::AccountNotFound` if no account has this email.
pub async fn items(email: &str) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|_| CommandError::InvalidEmail(email.to_owned()))?;
    let store = connect_store().await?;

    let inserted = seed_items(&store, &email).await?;
    tracing::info!("Seeding complete!");
    tracing::info!("  Items inserted: {inserted}");
    tracing::info!("  Items skipped (already exist): {}", DEFAULT_ITEMS.len() - inserted);
    Ok(())
}

/// Store-level seeding, returning how many items were inserted.
///
/// # Errors
///
/// Returns `CommandError::AccountNotFound` or the first store failure.
pub async fn seed_items(store: &dyn Store, email: &Email) -> Result<usize, CommandError> {
    let account = store
        .get_credentials(email)
        .await?
        .ok_or_else(|| CommandError::AccountNotFound(email.to_string()))?
        .account;

    let existing: HashSet<String> = store
        .list_items(account.id, Page::ALL)
        .await?
        .into_iter()
        .map(|item| item.name)
        .collect();

    let mut inserted = 0;
    for (name, unit) in DEFAULT_ITEMS {
        if existing.contains(*name) {
            continue;
        }
        let fields = ItemInput {
            name: Some((*name).to_owned()),
            unit: Some((*unit).to_owned()),
        }
        .validate()?;
        store.create_item(account.id, &fields).await?;
        inserted += 1;
    }
    Ok(inserted)
}
