//! HTTP error mapping
//!
//! Turns core [`RelayError`]s into JSON error responses. The detailed
//! cause is logged; clients only see a short fixed message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pinrelay_core::RelayError;
use thiserror::Error;

/// Error returned by route handlers
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub RelayError);

impl ApiError {
    /// Status code for this error
    pub fn status(&self) -> StatusCode {
        match self.0 {
            RelayError::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client
    pub fn public_message(&self) -> &'static str {
        match self.0 {
            RelayError::ConfigurationMissing(_) => "Search is not configured",
            RelayError::RequestBuild(_) => "Failed to create request",
            RelayError::Transport(_) => "Request failed",
            RelayError::Decode(_) => "Failed to decode response",
            RelayError::AuthorizationDenied(_) => "Domain not allowed",
            RelayError::FetchFailed(_) => "Failed to fetch image",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "Request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        (
            status,
            Json(serde_json::json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}
