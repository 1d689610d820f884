//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`, and every failure is answered with the standard
//! JSON envelope. Server errors also carry an [`ErrorDetail`] response
//! extension, which [`crate::middleware::error_detail_middleware`] turns into
//! the `error` body field outside production.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use flowrite_core::{DocketError, Envelope, ValidationErrors};

use crate::db::RepositoryError;
use crate::services::{AuthError, RecordError};

/// The 5xx envelope with internal detail filled in.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub Envelope<()>);

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Field-level validation failures.
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Record belongs to another account.
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate resource. Answered as 400 for client compatibility.
    #[error("{0}")]
    Conflict(String),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(err) => match err {
                AuthError::Validation(_) | AuthError::EmailTaken => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::AccountNotFound => StatusCode::NOT_FOUND,
                AuthError::PasswordHash | AuthError::Token(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Database(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) | Self::Auth(AuthError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    /// The message shown to clients. Never carries internal detail.
    fn public_message(&self) -> String {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation(_) => "Validation failed".to_owned(),
                AuthError::PasswordHash | AuthError::Token(_) | AuthError::Repository(_) => {
                    "Internal server error".to_owned()
                }
                other => other.to_string(),
            },
            Self::Database(_) | Self::Template(_) | Self::Internal(_) => {
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        }
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound(kind) => Self::NotFound(format!("{kind} not found")),
            RecordError::Forbidden => Self::Forbidden("Access denied".to_owned()),
            RecordError::BadRequest(message) => Self::BadRequest(message),
            RecordError::Validation(errors) => Self::Validation(errors),
            RecordError::Docket(e @ DocketError::NoMatchingRecords) => Self::NotFound(e.to_string()),
            RecordError::Docket(e @ DocketError::Total(_)) => Self::Internal(e.to_string()),
            RecordError::Repository(e) => e.into(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Database(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = Envelope::<()>::failure(self.public_message());

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            let mut detailed = body.clone();
            detailed.error = Some(self.to_string());
            let mut response = (status, Json(body)).into_response();
            response.extensions_mut().insert(ErrorDetail(detailed));
            return response;
        }

        if let Some(errors) = self.field_errors() {
            body.errors = errors.errors().to_vec();
        }
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated account.
pub fn set_sentry_user(account_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(account_id.to_string()),
            ..Default::default()
        }));
    });
}
