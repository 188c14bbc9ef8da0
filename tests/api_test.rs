use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use ytte::api::models::{ErrorResponse, IdentityResponse, InfoResponse};
use ytte::api::state::AppState;
use ytte::extractor::{DownloadOptions, ExtractError, MediaExtractor, MediaInfo};
use ytte::media::Container;
use ytte::staging::Staging;

/// In-process stand-in for the extraction engine
///
/// Records every download call and writes `payload` to the requested path,
/// plus an engine-style fragment file next to it.
#[derive(Default)]
struct FakeExtractor {
    title: Option<String>,
    payload: Vec<u8>,
    failure: Option<String>,
    downloads: Mutex<Vec<DownloadOptions>>,
}

impl FakeExtractor {
    fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            payload: b"fake media bytes".repeat(4096),
            ..Self::default()
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<DownloadOptions> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaExtractor for FakeExtractor {
    async fn fetch_info(&self, url: &str) -> Result<MediaInfo, ExtractError> {
        if let Some(message) = &self.failure {
            return Err(ExtractError::Failed {
                status: Some(1),
                message: message.clone(),
            });
        }

        let info = serde_json::from_value(json!({
            "id": "abc123",
            "webpage_url": url,
            "title": self.title,
            "thumbnail": "https://i.example.com/abc123.jpg",
            "formats": [
                {
                    "format_id": "137",
                    "ext": "mp4",
                    "resolution": "1920x1080",
                    "vcodec": "avc1.640028",
                    "acodec": "none",
                    "filesize": 52_428_800,
                    "format_note": "1080p",
                    "url": "https://cdn.example.com/v137",
                    "http_headers": {"User-Agent": "x"}
                },
                {
                    "format_id": "140",
                    "ext": "m4a",
                    "resolution": "audio only",
                    "vcodec": "none",
                    "acodec": "mp4a.40.2",
                    "filesize": null,
                    "format_note": "medium",
                    "tbr": 129.4
                }
            ]
        }))?;

        Ok(info)
    }

    async fn download(
        &self,
        _url: &str,
        options: &DownloadOptions,
    ) -> Result<MediaInfo, ExtractError> {
        self.downloads.lock().unwrap().push(options.clone());

        let stem = options.output.file_stem().unwrap().to_str().unwrap().to_string();
        let fragment = options
            .output
            .with_file_name(format!("{stem}.f137.mp4.part"));
        tokio::fs::write(&fragment, b"partial").await?;

        if let Some(message) = &self.failure {
            return Err(ExtractError::Failed {
                status: Some(1),
                message: message.clone(),
            });
        }

        tokio::fs::write(&options.output, &self.payload).await?;
        tokio::fs::remove_file(&fragment).await?;

        Ok(MediaInfo {
            title: self.title.clone(),
            ..MediaInfo::default()
        })
    }
}

/// Builds a test app with an isolated staging directory
fn build_test_app(extractor: Arc<FakeExtractor>) -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let staging = Staging::new(Some(temp_dir.path().to_path_buf()), "ytte-");
    let state = AppState::new(extractor, staging);

    (ytte::api::router(state), temp_dir)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

fn staged_files(dir: &TempDir) -> Vec<PathBuf> {
    std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_identity_ignores_query() {
    let (app, _dir) = build_test_app(Arc::new(FakeExtractor::default()));

    let response = app.oneshot(get("/?url=whatever&x=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: IdentityResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.message, "YT-TE Downloader Backend");
}

#[tokio::test]
async fn test_info_projects_seven_fields() {
    let (app, _dir) = build_test_app(Arc::new(FakeExtractor::titled("Clip")));

    let response = app
        .oneshot(get("/info?url=https%3A%2F%2Fexample.com%2Fwatch%3Fv%3Dabc123"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["title"], "Clip");
    assert_eq!(body["thumbnail"], "https://i.example.com/abc123.jpg");

    let formats = body["formats"].as_array().unwrap();
    assert_eq!(formats.len(), 2);
    for format in formats {
        let mut keys: Vec<&str> = format.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["acodec", "ext", "filesize", "format_id", "note", "resolution", "vcodec"]
        );
    }
    assert_eq!(formats[0]["note"], "1080p");
    assert_eq!(formats[1]["filesize"], Value::Null);

    let typed: InfoResponse = serde_json::from_value(body).unwrap();
    assert_eq!(typed.formats[1].acodec.as_deref(), Some("mp4a.40.2"));
}

#[tokio::test]
async fn test_info_engine_failure_is_structured() {
    let (app, _dir) = build_test_app(Arc::new(FakeExtractor::failing(
        "[youtube] abc123: Video unavailable",
    )));

    let response = app.oneshot(get("/info?url=https://example.com/gone")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.error, "[youtube] abc123: Video unavailable");
}

#[tokio::test]
async fn test_info_missing_url() {
    let (app, _dir) = build_test_app(Arc::new(FakeExtractor::default()));

    let response = app.oneshot(get("/info")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_download_merges_both_streams() {
    let extractor = Arc::new(FakeExtractor::titled("My: Video! (2023)"));
    let (app, dir) = build_test_app(extractor.clone());

    let response = app
        .oneshot(get(
            "/download?url=https://example.com/v&video_format_id=137&audio_format_id=140",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"My Video 2023.mp4\""
    );

    let calls = extractor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].format, "137+140");
    assert_eq!(calls[0].merge_output, Some(Container::Mp4));
    assert_eq!(calls[0].output.extension().unwrap(), "mp4");
    assert!(calls[0].output.starts_with(dir.path()));

    // still on disk until the body has been sent
    assert!(calls[0].output.exists());

    let body = body_bytes(response).await;
    assert_eq!(body, extractor.payload);
    assert!(staged_files(&dir).is_empty());
}

#[tokio::test]
async fn test_download_single_streams_never_merge() {
    let extractor = Arc::new(FakeExtractor::titled("Solo"));
    let (app, dir) = build_test_app(extractor.clone());

    let video = app
        .clone()
        .oneshot(get("/download?url=u&video_format_id=137"))
        .await
        .unwrap();
    assert_eq!(
        video.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Solo.mp4\""
    );
    body_bytes(video).await;

    let audio = app
        .oneshot(get("/download?url=u&video_format_id=&audio_format_id=140"))
        .await
        .unwrap();
    assert_eq!(
        audio.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Solo.m4a\""
    );
    body_bytes(audio).await;

    let calls = extractor.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].format, "137");
    assert_eq!(calls[0].merge_output, None);
    assert_eq!(calls[1].format, "140");
    assert_eq!(calls[1].merge_output, None);
    assert_eq!(calls[1].output.extension().unwrap(), "m4a");
    assert!(staged_files(&dir).is_empty());
}

#[tokio::test]
async fn test_download_without_format_ids() {
    let extractor = Arc::new(FakeExtractor::titled("Never"));
    let (app, dir) = build_test_app(extractor.clone());

    let response = app
        .oneshot(get("/download?url=https://example.com/v"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.error, "No format ID provided");
    assert!(extractor.calls().is_empty());
    assert!(staged_files(&dir).is_empty());
}

#[tokio::test]
async fn test_download_failure_cleans_up() {
    let extractor = Arc::new(FakeExtractor::failing(
        "Requested format is not available",
    ));
    let (app, dir) = build_test_app(extractor.clone());

    let response = app
        .oneshot(get(
            "/download?url=https://example.com/v&video_format_id=999&audio_format_id=140",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.error, "Requested format is not available");

    assert_eq!(extractor.calls().len(), 1);
    assert!(!extractor.calls()[0].output.exists());
    assert!(staged_files(&dir).is_empty());
}

#[tokio::test]
async fn test_download_title_of_forbidden_chars() {
    let (app, dir) = build_test_app(Arc::new(FakeExtractor::titled("?!:()")));

    let response = app
        .oneshot(get("/download?url=u&audio_format_id=140"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\".m4a\""
    );
    body_bytes(response).await;
    assert!(staged_files(&dir).is_empty());
}

#[tokio::test]
async fn test_dropped_response_cleans_up() {
    let extractor = Arc::new(FakeExtractor::titled("Abandoned"));
    let (app, dir) = build_test_app(extractor.clone());

    let response = app
        .oneshot(get("/download?url=u&video_format_id=18"))
        .await
        .unwrap();
    assert!(extractor.calls()[0].output.exists());

    drop(response);
    assert!(staged_files(&dir).is_empty());
}

#[tokio::test]
async fn test_concurrent_downloads_use_distinct_paths() {
    let extractor = Arc::new(FakeExtractor::titled("Parallel"));
    let (app, dir) = build_test_app(extractor.clone());

    let requests = (0..8).map(|i| {
        let app = app.clone();
        async move {
            let uri = format!("/download?url=https://example.com/{i}&video_format_id=137&audio_format_id=140");
            let response = app.oneshot(get(&uri)).await.unwrap();
            body_bytes(response).await
        }
    });
    let bodies = futures::future::join_all(requests).await;
    assert!(bodies.iter().all(|b| *b == extractor.payload));

    let mut paths: Vec<PathBuf> = extractor.calls().into_iter().map(|c| c.output).collect();
    assert_eq!(paths.len(), 8);
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 8);
    assert!(staged_files(&dir).is_empty());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (app, _dir) = build_test_app(Arc::new(FakeExtractor::default()));

    let request = Request::builder()
        .uri("/")
        .method("GET")
        .header(header::ORIGIN, "https://frontend.example.org")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_health_reports_counters() {
    let extractor = Arc::new(FakeExtractor::titled("Counted"));
    let (app, _dir) = build_test_app(extractor);

    let response = app
        .clone()
        .oneshot(get("/download?url=u&video_format_id=18"))
        .await
        .unwrap();
    body_bytes(response).await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["version"].is_string());
    assert_eq!(health["counters"]["downloads_started"], 1);
    assert_eq!(health["counters"]["downloads_served"], 1);
    assert_eq!(health["counters"]["downloads_failed"], 0);
}

#[tokio::test]
async fn test_download_counted_served_when_body_abandoned() {
    let extractor = Arc::new(FakeExtractor::titled("Abandoned"));
    let (app, dir) = build_test_app(extractor);

    let response = app
        .clone()
        .oneshot(get("/download?url=u&video_format_id=18"))
        .await
        .unwrap();
    drop(response);
    assert!(staged_files(&dir).is_empty());

    let response = app.oneshot(get("/health")).await.unwrap();
    let health: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health["counters"]["downloads_served"], 1);
    assert_eq!(health["counters"]["downloads_failed"], 0);
}

#[tokio::test]
async fn test_download_staging_failure_is_structured() {
    let extractor = Arc::new(FakeExtractor::titled("Unstaged"));
    let staging = Staging::new(Some(PathBuf::from("/nonexistent/ytte-staging")), "ytte-");
    let app = ytte::api::router(AppState::new(extractor.clone(), staging));

    let response = app
        .clone()
        .oneshot(get("/download?url=u&video_format_id=18"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.error.starts_with("staging failed"));
    assert!(extractor.calls().is_empty());

    let response = app.oneshot(get("/health")).await.unwrap();
    let health: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health["counters"]["downloads_failed"], 1);
}
