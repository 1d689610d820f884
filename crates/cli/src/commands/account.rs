//! Account management commands.

use flowrite_core::AccountId;
use flowrite_server::services::auth::{CredentialsInput, create_account};

use super::{CommandError, connect_store};

/// Register an account with the same validation as `POST /api/auth/register`.
///
/// # Errors
///
/// Returns `CommandError::Auth` for invalid input or a taken email.
pub async fn create(email: &str, password: &str) -> Result<AccountId, CommandError> {
    let store = connect_store().await?;

    let account = create_account(
        &store,
        CredentialsInput {
            email: Some(email.to_owned()),
            password: Some(password.to_owned()),
        },
    )
    .await?;

    tracing::info!(
        "Account created successfully! ID: {}, Email: {}",
        account.id,
        account.email
    );
    Ok(account.id)
}
