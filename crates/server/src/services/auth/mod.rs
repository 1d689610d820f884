//! Authentication service.
//!
//! Password registration and login with argon2 hashes, and bearer tokens
//! (HS256 JWT) for every request after that.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TokenKeys};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};

use flowrite_core::{Account, AccountId, Email, ValidationErrors};

use crate::db::{RepositoryError, Store};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Register / login request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A freshly issued token and the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: Account,
}

/// Authentication service.
///
/// Handles account registration, login and token resolution.
pub struct AuthService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, tokens: &'a TokenKeys) -> Self {
        Self { store, tokens }
    }

    /// Register a new account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the email or password is invalid.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(&self, input: CredentialsInput) -> Result<Session, AuthError> {
        let account = create_account(self.store, input).await?;
        self.session(account)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if either field is missing.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn authenticate(&self, input: CredentialsInput) -> Result<Session, AuthError> {
        let (email, password) = validate_login(input)?;

        let credentials = self
            .store
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&password, &credentials.password_hash)?;

        tracing::info!(account_id = %credentials.account.id, "Login succeeded");
        self.session(credentials.account)
    }

    /// Resolve a bearer token to its account id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` when no token is given and
    /// `AuthError::InvalidToken` when it does not verify.
    pub fn resolve(&self, token: Option<&str>) -> Result<AccountId, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.tokens.verify(token)
    }

    /// The account behind an authenticated request.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the account no longer exists.
    pub async fn current(&self, id: AccountId) -> Result<Account, AuthError> {
        self.store
            .get_account(id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    fn session(&self, account: Account) -> Result<Session, AuthError> {
        let token = self.tokens.issue(&account)?;
        Ok(Session {
            token,
            user: account,
        })
    }
}

/// Validate, hash and insert a new account without issuing a token.
///
/// # Errors
///
/// Returns `AuthError::Validation` if the email or password is invalid.
/// Returns `AuthError::EmailTaken` if the email is already registered.
pub async fn create_account(store: &dyn Store, input: CredentialsInput) -> Result<Account, AuthError> {
    let (email, password) = validate_registration(input)?;
    let password_hash = hash_password(&password)?;

    let account = store
        .create_account(&email, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Repository(other),
        })?;

    tracing::info!(account_id = %account.id, "Account registered");
    Ok(account)
}

fn validate_registration(input: CredentialsInput) -> Result<(Email, String), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = input
        .email
        .as_deref()
        .and_then(|e| Email::parse(e).ok());
    if email.is_none() {
        errors.push("email", "Valid email is required");
    }

    let password = input.password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long"),
        );
    }

    match email {
        Some(email) if errors.is_empty() => Ok((email, password)),
        _ => Err(errors),
    }
}

fn validate_login(input: CredentialsInput) -> Result<(Email, String), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = input
        .email
        .as_deref()
        .and_then(|e| Email::parse(e).ok());
    if email.is_none() {
        errors.push("email", "Valid email is required");
    }

    let password = input.password.unwrap_or_default();
    if password.is_empty() {
        errors.push("password", "Password is required");
    }

    match email {
        Some(email) if errors.is_empty() => Ok((email, password)),
        _ => Err(errors),
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::db::MemoryStore;

    fn keys() -> TokenKeys {
        TokenKeys::new(&SecretString::from("k7Qm2xVp9Lr4Tz8Nw3Hs6Jd1Fb5Gc0Ya"), 7)
    }

    fn credentials(email: &str, password: &str) -> CredentialsInput {
        CredentialsInput {
            email: Some(email.to_owned()),
            password: Some(password.to_owned()),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret-password").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret-password", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_registration_validation() {
        let errors = validate_registration(credentials("nope", "123")).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password"]);
        assert_eq!(
            errors.errors()[1].message,
            "Password must be at least 6 characters long"
        );
    }

    #[tokio::test]
    async fn test_register_login_resolve() {
        let store = MemoryStore::new();
        let keys = keys();
        let auth = AuthService::new(&store, &keys);

        let registered = auth
            .register(credentials("Owner@Example.com", "hunter22"))
            .await
            .unwrap();
        let login = auth
            .authenticate(credentials("owner@example.com", "hunter22"))
            .await
            .unwrap();

        assert_eq!(login.user.id, registered.user.id);
        assert_eq!(auth.resolve(Some(&login.token)).unwrap(), registered.user.id);
        let current = auth.current(registered.user.id).await.unwrap();
        assert_eq!(current.email.as_str(), "owner@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let store = MemoryStore::new();
        let keys = keys();
        let auth = AuthService::new(&store, &keys);

        auth.register(credentials("a@example.com", "hunter22")).await.unwrap();
        let again = auth.register(credentials("A@EXAMPLE.COM", "other-pass")).await;
        assert!(matches!(again, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_look_the_same() {
        let store = MemoryStore::new();
        let keys = keys();
        let auth = AuthService::new(&store, &keys);
        auth.register(credentials("a@example.com", "hunter22")).await.unwrap();

        let unknown = auth
            .authenticate(credentials("b@example.com", "hunter22"))
            .await
            .unwrap_err();
        let wrong = auth
            .authenticate(credentials("a@example.com", "hunter23"))
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn test_resolve_without_token() {
        let store = MemoryStore::new();
        let keys = keys();
        let auth = AuthService::new(&store, &keys);
        assert!(matches!(auth.resolve(None), Err(AuthError::MissingToken)));
        assert!(matches!(auth.resolve(Some("  ")), Err(AuthError::MissingToken)));
    }
}
