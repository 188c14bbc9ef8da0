use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

use crate::media::Container;

/// Metadata reported by the engine for one media item
///
/// Only the fields the service reads are modelled; everything else in the
/// engine's JSON is ignored on deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub formats: Vec<RawFormat>,
}

/// One format record as the engine reports it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default, deserialize_with = "lenient_size")]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub format_note: Option<String>,
}

/// Download-mode parameters
///
/// Playlist expansion is always disabled and overwriting is always enabled;
/// they are not options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Format expression, e.g. `137` or `137+140`
    pub format: String,
    /// Destination path (the staged file)
    pub output: PathBuf,
    /// Merge target, present only when two streams are combined
    pub merge_output: Option<Container>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RawFormat>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawFormat>>::deserialize(deserializer)?.unwrap_or_default())
}

// Some extractors report sizes as floats.
fn lenient_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(value.and_then(|n| {
        n.as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
    }))
}
