//! Authentication error types.

use thiserror::Error;

use flowrite_core::ValidationErrors;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Email already registered.
    #[error("Email already registered")]
    EmailTaken,

    /// No bearer token on the request.
    #[error("No token, authorization denied")]
    MissingToken,

    /// Token malformed, expired or wrongly signed.
    #[error("Token is not valid")]
    InvalidToken,

    /// Token was valid but the account no longer exists.
    #[error("User not found")]
    AccountNotFound,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token could not be signed.
    #[error("token error: {0}")]
    Token(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
