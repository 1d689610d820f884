//! Account registration, login and the current-account lookup.

use axum::extract::State;
use tracing::instrument;

use flowrite_core::Account;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::services::auth::{CredentialsInput, Session};
use crate::state::AppState;

/// `POST /api/auth/register`
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CredentialsInput>,
) -> Result<ApiResponse<Session>> {
    let session = state.auth().register(input).await?;
    Ok(ApiResponse::created(session).with_message("User registered successfully"))
}

/// `POST /api/auth/login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CredentialsInput>,
) -> Result<ApiResponse<Session>> {
    let session = state.auth().authenticate(input).await?;
    Ok(ApiResponse::ok(session).with_message("Login successful"))
}

/// `GET /api/auth/me`
#[instrument(skip(state))]
pub async fn me(
    RequireAuth(account_id): RequireAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Account>> {
    Ok(ApiResponse::ok(state.auth().current(account_id).await?))
}
