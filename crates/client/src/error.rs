//! Client error types.

use thiserror::Error;

use flowrite_core::{AmountError, DocketError};

/// Errors returned by [`ApiClient`](crate::ApiClient) and
/// [`ClientStore`](crate::ClientStore).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL is unusable.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// A success response could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A success envelope carried no data.
    #[error("response contained no data")]
    MissingData,

    /// Local docket aggregation failed.
    #[error(transparent)]
    Docket(#[from] DocketError),

    /// Local totals could not be computed.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl ClientError {
    /// HTTP status for `Api` errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
