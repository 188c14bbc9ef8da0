//! Request-scoped temporary files for downloads
//!
//! A [`StagedDownload`] is created right before the engine runs and is
//! removed when it is dropped, whichever way the request ends. On success it
//! becomes a [`StagedStream`], which carries the same guarantee until the
//! last chunk has been handed to the response body.

use axum::body::Bytes;
use futures::Stream;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tempfile::TempPath;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::StagingConfig;
use crate::media::Container;

/// Allocator for staged download files
#[derive(Debug, Clone)]
pub struct Staging {
    dir: PathBuf,
    prefix: String,
}

impl Staging {
    /// `dir` defaults to the system temporary directory
    pub fn new(dir: Option<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &StagingConfig) -> Self {
        Self::new(config.dir.clone(), config.prefix.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create an empty, uniquely named file with the container's extension.
    ///
    /// The file is created with exclusive-create semantics, so two requests
    /// can never be handed the same path.
    pub fn allocate(&self, container: Container) -> io::Result<StagedDownload> {
        let prefix = format!("{}{}-", self.prefix, Uuid::new_v4().simple());
        let suffix = format!(".{}", container.extension());

        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        let path = file.into_temp_path();

        debug!(path = %path.display(), "Allocated staged download");
        Ok(StagedDownload { path: Some(path) })
    }
}

/// Temporary file owned by exactly one request
#[derive(Debug)]
pub struct StagedDownload {
    path: Option<TempPath>,
}

impl StagedDownload {
    pub fn path(&self) -> &Path {
        match &self.path {
            Some(path) => &**path,
            None => Path::new(""),
        }
    }

    /// Open the staged file for lazy streaming.
    ///
    /// Returns the stream and the file length. Cleanup responsibility moves
    /// into the stream.
    pub async fn into_stream(self) -> io::Result<(StagedStream, u64)> {
        let file = tokio::fs::File::open(self.path()).await?;
        let len = file.metadata().await?.len();

        let stream = StagedStream {
            inner: ReaderStream::new(file),
            staged: Some(self),
        };
        Ok((stream, len))
    }

    fn cleanup(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let owned = path.to_path_buf();

        match path.close() {
            Ok(()) => debug!(path = %owned.display(), "Removed staged download"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %owned.display(), error = %err, "Failed to remove staged download"),
        }

        remove_side_files(&owned);
    }
}

impl Drop for StagedDownload {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Engine leftovers share the staged file's stem: `.part` files, per-stream
/// fragments such as `<stem>.f137.mp4`, merge temporaries.
fn remove_side_files(path: &Path) {
    let (Some(dir), Some(stem)) = (path.parent(), path.file_stem().and_then(|s| s.to_str())) else {
        return;
    };
    let marker = format!("{stem}.");

    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(&marker) {
            continue;
        }
        let side = entry.path();
        match std::fs::remove_file(&side) {
            Ok(()) => debug!(path = %side.display(), "Removed extractor side file"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %side.display(), error = %err, "Failed to remove extractor side file"),
        }
    }
}

/// File body that deletes its backing file once fully read or dropped
pub struct StagedStream {
    inner: ReaderStream<tokio::fs::File>,
    staged: Option<StagedDownload>,
}

impl Stream for StagedStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_next(cx);

        // ReaderStream has already released the file handle at this point
        if matches!(poll, Poll::Ready(None) | Poll::Ready(Some(Err(_)))) {
            this.staged.take();
        }

        poll
    }
}
