//! Internal error detail for non-production deployments.
//!
//! [`AppError`](crate::error::AppError) answers every 5xx with a generic
//! message and attaches the detailed envelope as an [`ErrorDetail`]
//! extension. This middleware swaps that envelope in when the application
//! state allows it, and strips the extension either way.

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ErrorDetail;
use crate::state::AppState;

/// Middleware that exposes 5xx detail when enabled on the state.
pub async fn error_detail_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(ErrorDetail(detailed)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    if !state.expose_error_details() {
        return response;
    }
    (response.status(), Json(detailed)).into_response()
}
