//! Request and response shapes of the HTTP surface.
//!
//! | Route       | Query                                           | Success                      |
//! |-------------|-------------------------------------------------|------------------------------|
//! | `/`         | none                                            | [`IdentityResponse`]         |
//! | `/info`     | `url`                                           | [`InfoResponse`]             |
//! | `/download` | `url`, `video_format_id?`, `audio_format_id?`   | attachment byte stream       |
//!
//! Every failure body is an [`ErrorResponse`].

use serde::{Deserialize, Serialize};

use crate::media::FormatDescriptor;
use crate::observability::MetricsSnapshot;

pub const IDENTITY_MESSAGE: &str = "YT-TE Downloader Backend";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct IdentityResponse {
    pub message: String,
}

impl Default for IdentityResponse {
    fn default() -> Self {
        Self {
            message: IDENTITY_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfoQuery {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InfoResponse {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub formats: Vec<FormatDescriptor>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownloadQuery {
    pub url: String,
    #[serde(default)]
    pub video_format_id: Option<String>,
    #[serde(default)]
    pub audio_format_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub counters: MetricsSnapshot,
}
