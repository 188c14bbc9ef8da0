use super::error::ApiError;
use super::models::DownloadQuery;
use crate::media::FormatSelection;

/// Resolve the requested streams, before any file or network activity.
pub fn download_selection(query: &DownloadQuery) -> Result<FormatSelection, ApiError> {
    FormatSelection::from_ids(
        query.video_format_id.as_deref(),
        query.audio_format_id.as_deref(),
    )
    .ok_or(ApiError::MissingFormat)
}
