//! Success responses in the standard envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use flowrite_core::Envelope;

/// A success response: status code plus `{success: true, message?, data?}`.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T> ApiResponse<T> {
    /// 200 with data.
    pub const fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope::success(Some(data), None),
        }
    }

    /// 201 with data.
    pub const fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Envelope::success(Some(data), None),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// 200 with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope::success(None, Some(message.into())),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
