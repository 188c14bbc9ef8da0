//! API utility functions
//!
//! Pure helpers for building download responses.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
};

use crate::api::error::ApiError;
use crate::media::content_disposition;

/// Headers for an attachment download of `len` bytes
pub fn attachment_headers(filename: &str, len: u64) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();

    let content_type = HeaderValue::from_str(mime::APPLICATION_OCTET_STREAM.as_ref())
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(len));

    let disposition = HeaderValue::from_str(&content_disposition(filename)).map_err(|_| {
        ApiError::Internal(format!("cannot build Content-Disposition for {filename:?}"))
    })?;
    headers.insert(CONTENT_DISPOSITION, disposition);

    Ok(headers)
}
