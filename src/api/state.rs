use std::sync::Arc;

use crate::config::Config;
use crate::extractor::{MediaExtractor, YtDlp};
use crate::observability::Metrics;
use crate::staging::Staging;

/// Shared, read-only service wiring; nothing here carries per-request state
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn MediaExtractor>,
    pub staging: Arc<Staging>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(extractor: Arc<dyn MediaExtractor>, staging: Staging) -> Self {
        Self {
            extractor,
            staging: Arc::new(staging),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Wire the `yt-dlp` engine and staging directory from configuration
    pub fn from_config(config: &Config) -> Self {
        let extractor = Arc::new(YtDlp::new(config.extractor.clone()));
        Self::new(extractor, Staging::from_config(&config.staging))
    }
}
