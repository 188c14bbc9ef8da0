use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::extractor::ExtractError;

/// Handler-boundary failures
///
/// Domain failures are answered with `200 OK` and an `{"error": ...}` body;
/// clients of this service key off the body, not the status. Only malformed
/// query strings get a distinct status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No format ID provided")]
    MissingFormat,
    #[error("{0}")]
    InvalidQuery(String),
    #[error("{0}")]
    Extraction(#[from] ExtractError),
    #[error("staging failed: {0}")]
    Staging(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MissingFormat
            | ApiError::Extraction(_)
            | ApiError::Staging(_)
            | ApiError::Internal(_) => StatusCode::OK,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        ApiError::InvalidQuery(value.body_text())
    }
}
