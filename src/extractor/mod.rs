//! External media-extraction engine
//!
//! The service never resolves media itself. It hands a URL to an engine
//! behind the [`MediaExtractor`] trait and reshapes whatever comes back.
//!
//! ## Key Components
//!
//! - [`MediaExtractor`] - seam the HTTP handlers call into
//! - [`YtDlp`] - engine backed by the `yt-dlp` executable
//! - [`MediaInfo`] / [`RawFormat`] - engine metadata as reported
//! - [`DownloadOptions`] - what to fetch and where to write it

mod traits;
mod types;
mod ytdlp;

pub use traits::{ExtractError, MediaExtractor};
pub use types::{DownloadOptions, MediaInfo, RawFormat};
pub use ytdlp::YtDlp;
