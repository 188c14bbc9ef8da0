use axum::{
    Json,
    body::Body,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use super::{
    error::ApiError,
    models::{DownloadQuery, HealthResponse, IdentityResponse, InfoQuery, InfoResponse},
    state::AppState,
    utils::attachment_headers,
    validation::download_selection,
};
use crate::extractor::DownloadOptions;
use crate::media::{FormatDescriptor, FormatSelection, attachment_filename};

/// Identity endpoint (GET /)
///
/// Always the same payload; query parameters are ignored.
pub async fn identity() -> Json<IdentityResponse> {
    Json(IdentityResponse::default())
}

/// Metadata endpoint (GET /info?url=...)
///
/// Fetches metadata for the URL with playlist expansion disabled and projects each engine
/// format record down to the public [`FormatDescriptor`] fields.
pub async fn info(
    State(state): State<AppState>,
    query: Result<Query<InfoQuery>, QueryRejection>,
) -> Result<Json<InfoResponse>, ApiError> {
    let Query(query) = query?;

    state.metrics.info_requested();
    let media = state.extractor.fetch_info(&query.url).await.map_err(|err| {
        state.metrics.info_failed();
        warn!(url = %query.url, error = %err, "Metadata lookup failed");
        err
    })?;

    info!(url = %query.url, formats = media.formats.len(), "Resolved media info");

    Ok(Json(InfoResponse {
        formats: media.formats.iter().map(FormatDescriptor::from).collect(),
        title: media.title,
        thumbnail: media.thumbnail,
    }))
}

/// Download endpoint (GET /download?url=...&video_format_id=...&audio_format_id=...)
///
/// ## Flow:
/// 1. Validate the format identifiers (no side effects on failure)
/// 2. Allocate a uniquely named staged file with the target extension
/// 3. Run the engine into the staged file, merging only for two streams
/// 4. Stream the file back as an attachment; it is deleted once the body
///    has been fully sent or dropped
///
/// Any failure in 2-3 drops the staged file, which deletes it.
pub async fn download(
    State(state): State<AppState>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let selection = download_selection(&query)?;

    state.metrics.download_started();
    match stage_and_stream(&state, &query.url, &selection).await {
        Ok(response) => {
            state.metrics.download_served();
            Ok(response)
        }
        Err(err) => {
            state.metrics.download_failed();
            warn!(url = %query.url, format = %selection.expression(), error = %err, "Download failed");
            Err(err)
        }
    }
}

async fn stage_and_stream(
    state: &AppState,
    url: &str,
    selection: &FormatSelection,
) -> Result<Response, ApiError> {
    let container = selection.container();
    let staged = state.staging.allocate(container)?;

    let options = DownloadOptions {
        format: selection.expression(),
        output: staged.path().to_path_buf(),
        merge_output: selection.merge_output(),
    };

    info!(
        url,
        format = %options.format,
        merge = ?options.merge_output,
        path = %options.output.display(),
        "Starting download"
    );

    let media = state.extractor.download(url, &options).await?;
    let filename = attachment_filename(media.title.as_deref(), container);

    let (stream, len) = staged.into_stream().await?;
    let headers = attachment_headers(&filename, len)?;

    info!(url, %filename, bytes = len, "Streaming staged download");

    Ok((headers, Body::from_stream(stream)).into_response())
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        counters: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(response))
}
