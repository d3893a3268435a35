//! HTTP error responses for the small-giants server.
//!
//! Every failure renders as `{ "error": CODE, "detail": message }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use smallgiants_core::Error;

/// Errors surfaced by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Query string could not be decoded or a value is out of range.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Any error from the listing pipeline.
    #[error(transparent)]
    Core(#[from] Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                Error::InvalidInput(_) | Error::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
                Error::UpstreamFetch { .. } | Error::Parse { .. } => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Core(err) => err.code(),
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::Core(Error::Config(err)) => err.to_string(),
            ApiError::Core(Error::UpstreamFetch { page, reason } | Error::Parse { page, reason }) => {
                format!("page {page}: {reason}")
            }
            ApiError::Core(Error::InvalidInput(msg) | Error::UnsupportedFormat(msg)) => msg.clone(),
            ApiError::Core(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = ErrorBody { error: self.code(), detail: self.detail() };
        (status, Json(body)).into_response()
    }
}
