//! Health endpoints.
//!
//! `/health` and `/health/ready` are for load balancers; `/api/health` is the
//! client-facing status check.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiHealth {
    pub status: &'static str,
    pub store: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// `GET /health` - process is up.
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /health/ready` - the store answers queries.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// `GET /api/health`
pub async fn api_health(State(state): State<AppState>) -> Json<ApiHealth> {
    Json(ApiHealth {
        status: "ok",
        store: state.store().backend(),
        timestamp: Utc::now(),
    })
}
