//! Error types for cc-ai
//!
//! Every failure leaves the service as `{ "error", "code", "raw"? }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cc_common::ai_types::ErrorResponse;
use thiserror::Error;

use crate::reply::ReplyError;

pub const NOT_CONFIGURED_MESSAGE: &str = "AI service not configured. Please add GOOGLE_API_KEY to environment.";
pub const UPSTREAM_FAILED_MESSAGE: &str = "AI analysis failed. Please try again.";
pub const PARSE_FAILED_MESSAGE: &str = "Failed to parse AI response";
pub const SCHEMA_FAILED_MESSAGE: &str = "AI response did not match the expected format";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No provider key (500)
    #[error("{}", NOT_CONFIGURED_MESSAGE)]
    NotConfigured,

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Provider failed or returned nothing (500)
    #[error("{0}")]
    Upstream(String),

    /// Reply was not JSON (500)
    #[error("{}", PARSE_FAILED_MESSAGE)]
    Parse { raw: String },

    /// Reply was JSON of the wrong shape (500)
    #[error("{}: {}", SCHEMA_FAILED_MESSAGE, .detail)]
    Schema { detail: String, raw: String },
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotConfigured => "CONFIG_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::Parse { .. } => "PARSE_ERROR",
            ApiError::Schema { .. } => "SCHEMA_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReplyError> for ApiError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::Parse { raw, .. } => ApiError::Parse { raw },
            ReplyError::Schema { message, raw } => ApiError::Schema { detail: message, raw },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (error, raw) = match self {
            ApiError::Parse { raw } => (PARSE_FAILED_MESSAGE.to_string(), Some(raw)),
            ApiError::Schema { raw, .. } => (SCHEMA_FAILED_MESSAGE.to_string(), Some(raw)),
            other => (other.to_string(), None),
        };

        let body = Json(ErrorResponse {
            error,
            code: Some(code.to_string()),
            raw,
        });

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
