use async_trait::async_trait;
use thiserror::Error;

use super::types::{DownloadOptions, MediaInfo};

/// Extraction engine errors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0} is not installed or not on PATH")]
    NotInstalled(String),
    #[error("failed to run extractor: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("{message}")]
    Failed { status: Option<i32>, message: String },
    #[error("extractor returned unreadable metadata: {0}")]
    InvalidOutput(#[from] serde_json::Error),
}

/// Media extraction engine (metadata discovery and download)
///
/// Both operations treat a collection URL as a single item. Implementations
/// must not retry: the first failure is final for the request.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Resolve metadata without downloading anything
    async fn fetch_info(&self, url: &str) -> Result<MediaInfo, ExtractError>;

    /// Download (and merge, if requested) into `options.output`
    ///
    /// An existing file at the output path is overwritten.
    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<MediaInfo, ExtractError>;
}
