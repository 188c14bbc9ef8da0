//! `yt-dlp` process backend

use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use super::traits::{ExtractError, MediaExtractor};
use super::types::{DownloadOptions, MediaInfo};
use crate::config::ExtractorConfig;

/// Engine that shells out to the `yt-dlp` executable
///
/// Every invocation asks for `--dump-single-json`, so stdout carries the
/// item metadata in both metadata and download mode. Children are spawned with
/// `kill_on_drop`, so an abandoned request also stops its engine process.
#[derive(Debug, Clone)]
pub struct YtDlp {
    config: ExtractorConfig,
}

impl YtDlp {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    fn metadata_args(&self, url: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["--dump-single-json", "--no-playlist", "--no-warnings"]
            .into_iter()
            .map(OsString::from)
            .collect();
        self.push_common(&mut args, url);
        args
    }

    fn download_args(&self, url: &str, options: &DownloadOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--dump-single-json",
            "--no-simulate",
            "--no-playlist",
            "--force-overwrites",
            "--no-warnings",
            "--no-progress",
            "-f",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push(options.format.clone().into());
        args.push("-o".into());
        args.push(output_template(&options.output));

        if let Some(container) = options.merge_output {
            args.push("--merge-output-format".into());
            args.push(container.extension().into());
        }

        if let Some(ffmpeg) = &self.config.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone().into_os_string());
        }

        self.push_common(&mut args, url);
        args
    }

    // extra args, then the URL behind `--` so it is never read as a flag
    fn push_common(&self, args: &mut Vec<OsString>, url: &str) {
        args.extend(self.config.extra_args.iter().map(OsString::from));
        args.push("--".into());
        args.push(url.into());
    }

    async fn run(&self, args: Vec<OsString>) -> Result<MediaInfo, ExtractError> {
        debug!(binary = %self.config.binary, ?args, "Spawning extractor");

        let output = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => ExtractError::NotInstalled(self.config.binary.clone()),
                _ => ExtractError::Spawn(err),
            })?;

        if !output.status.success() {
            let message = failure_message(&output.stderr)
                .unwrap_or_else(|| format!("extractor exited with {}", output.status));
            warn!(status = ?output.status.code(), %message, "Extractor failed");
            return Err(ExtractError::Failed {
                status: output.status.code(),
                message,
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn fetch_info(&self, url: &str) -> Result<MediaInfo, ExtractError> {
        self.run(self.metadata_args(url)).await
    }

    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<MediaInfo, ExtractError> {
        self.run(self.download_args(url, options)).await
    }
}

/// `-o` takes a template; a literal `%` in the path must be doubled.
fn output_template(path: &Path) -> OsString {
    match path.to_str() {
        Some(s) => s.replace('%', "%%").into(),
        None => path.as_os_str().to_owned(),
    }
}

/// Most useful line of engine stderr: the last `ERROR:` line without its
/// prefix, else the last non-empty line.
fn failure_message(stderr: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find_map(|line| line.strip_prefix("ERROR:"))
        .map(|msg| msg.trim().to_string())
        .or_else(|| lines.last().map(|line| line.to_string()))
}
