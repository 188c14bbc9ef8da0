//! Format selection, format projection and attachment naming.
//!
//! Everything here is pure: no filesystem, no process spawning. The HTTP
//! layer validates query parameters into a [`FormatSelection`] before any
//! side effect happens, and shapes engine output into [`FormatDescriptor`]s.

use serde::{Deserialize, Serialize};

use crate::extractor::RawFormat;

/// Title used when the engine reports none.
pub const FALLBACK_TITLE: &str = "download";

/// Output container of a staged download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// Merged or video-only output.
    Mp4,
    /// Audio-only output.
    M4a,
}

impl Container {
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::M4a => "m4a",
        }
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which stream(s) a download request asked for.
///
/// A request with neither identifier has no representation here; see
/// [`FormatSelection::from_ids`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSelection {
    VideoOnly(String),
    AudioOnly(String),
    Both { video: String, audio: String },
}

impl FormatSelection {
    /// Build a selection from the optional query identifiers.
    ///
    /// Empty strings count as absent. Returns `None` when both are absent.
    pub fn from_ids(video: Option<&str>, audio: Option<&str>) -> Option<Self> {
        let video = video.filter(|id| !id.is_empty());
        let audio = audio.filter(|id| !id.is_empty());

        match (video, audio) {
            (Some(video), Some(audio)) => Some(FormatSelection::Both {
                video: video.to_string(),
                audio: audio.to_string(),
            }),
            (Some(video), None) => Some(FormatSelection::VideoOnly(video.to_string())),
            (None, Some(audio)) => Some(FormatSelection::AudioOnly(audio.to_string())),
            (None, None) => None,
        }
    }

    /// Format expression handed to the engine.
    pub fn expression(&self) -> String {
        match self {
            FormatSelection::VideoOnly(id) | FormatSelection::AudioOnly(id) => id.clone(),
            FormatSelection::Both { video, audio } => format!("{video}+{audio}"),
        }
    }

    pub fn container(&self) -> Container {
        match self {
            FormatSelection::VideoOnly(_) | FormatSelection::Both { .. } => Container::Mp4,
            FormatSelection::AudioOnly(_) => Container::M4a,
        }
    }

    /// Merge directive: only issued when two streams are combined.
    pub fn merge_output(&self) -> Option<Container> {
        match self {
            FormatSelection::Both { .. } => Some(Container::Mp4),
            _ => None,
        }
    }
}

/// Public view of one available stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub resolution: Option<String>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub filesize: Option<u64>,
    pub note: Option<String>,
}

impl From<&RawFormat> for FormatDescriptor {
    fn from(raw: &RawFormat) -> Self {
        Self {
            format_id: raw.format_id.clone(),
            ext: raw.ext.clone(),
            resolution: raw.resolution.clone(),
            vcodec: raw.vcodec.clone(),
            acodec: raw.acodec.clone(),
            filesize: raw.filesize,
            note: raw.format_note.clone(),
        }
    }
}

/// Keep alphanumerics, spaces, hyphens and underscores, then trim trailing
/// whitespace.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim_end().to_string()
}

/// User-facing filename for a finished download.
///
/// An empty sanitized title yields just `.<ext>`.
pub fn attachment_filename(title: Option<&str>, container: Container) -> String {
    let base = sanitize_title(title.unwrap_or(FALLBACK_TITLE));
    format!("{base}.{}", container.extension())
}

/// `Content-Disposition` value for an attachment.
///
/// Plain ASCII names produce `attachment; filename="<name>"`. Anything else
/// gets an ASCII fallback plus an RFC 5987 `filename*` parameter.
pub fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        return format!("attachment; filename=\"{filename}\"");
    }

    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();

    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}
