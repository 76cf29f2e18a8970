//! HTTP surface tests using an in-process router with stub backends.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use clipper_api::{create_router, AppConfig, AppState};
use clipper_media::{
    EncodeBackend, EncodeResult, MediaDownloader, MediaError, MediaResult, VideoInfo,
};
use clipper_models::{ClipPlan, Job, ProcessOptions};
use clipper_store::JobStore;

struct StubEncoder;

#[async_trait]
impl EncodeBackend for StubEncoder {
    async fn probe(&self, _input: &Path) -> MediaResult<VideoInfo> {
        Ok(VideoInfo {
            duration: 600.0,
            width: 1920,
            height: 1080,
            fps: 30.0,
            codec: "h264".to_string(),
            size: 1_000_000,
        })
    }

    async fn encode_clip(
        &self,
        _input: &Path,
        _plan: &ClipPlan,
        output: &Path,
    ) -> MediaResult<EncodeResult> {
        tokio::fs::write(output, vec![0u8; 16 * 1024]).await?;
        Ok(EncodeResult { size: 16 * 1024 })
    }
}

struct StubDownloader;

#[async_trait]
impl MediaDownloader for StubDownloader {
    async fn download(&self, _url: &str, _dest_dir: &Path) -> MediaResult<PathBuf> {
        Err(MediaError::download_failed("not used in these tests"))
    }
}

struct TestApp {
    state: AppState,
    _dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
    std::fs::create_dir_all(dir.path().join("output")).unwrap();

    let config = AppConfig {
        upload_dir: dir.path().join("uploads").to_string_lossy().to_string(),
        output_dir: dir.path().join("output").to_string_lossy().to_string(),
        jobs_file: dir.path().join("jobs.json").to_string_lossy().to_string(),
        ..AppConfig::default()
    };
    let store = Arc::new(JobStore::new(&config.jobs_file));
    let state =
        AppState::with_backends(config, store, Arc::new(StubEncoder), Arc::new(StubDownloader));
    TestApp { state, _dir: dir }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "clipper-api");
}

#[tokio::test]
async fn test_status_unknown_job() {
    let app = test_app();
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(
            Request::get("/api/status/no-such-job")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Job not found");
}

#[tokio::test]
async fn test_jobs_empty() {
    let app = test_app();
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(Request::get("/api/jobs").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert!(body["jobs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_jobs_lists_existing() {
    let app = test_app();

    let job = Job::new("in.mp4", "out", ProcessOptions::default());
    app.state.store.put(job).await.unwrap();

    let router = create_router(app.state.clone());
    let response = router
        .oneshot(Request::get("/api/jobs").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["jobs"][0]["status"], "queued");
}

#[tokio::test]
async fn test_process_missing_filepath() {
    let app = test_app();
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(
            Request::post("/api/process")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"clips": 3}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No video file specified");
}

#[tokio::test]
async fn test_process_nonexistent_file() {
    let app = test_app();
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(
            Request::post("/api/process")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"filepath": "/nonexistent/video.mp4"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Video file not found");
}

#[tokio::test]
async fn test_process_accepts_job() {
    let app = test_app();

    let input = PathBuf::from(&app.state.config.upload_dir).join("video.mp4");
    std::fs::write(&input, vec![0u8; 1024]).unwrap();

    let router = create_router(app.state.clone());
    let payload = serde_json::json!({
        "filepath": input.to_string_lossy(),
        "clips": 2,
        "platform": "tiktok",
    });

    let response = router
        .oneshot(
            Request::post("/api/process")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let job_id = body["job_id"].as_str().unwrap().to_string();
    assert_eq!(body["status"], "queued");
    assert_eq!(body["status_url"], format!("/api/status/{job_id}"));

    // The job record is visible immediately via the status endpoint.
    let router = create_router(app.state.clone());
    let response = router
        .oneshot(
            Request::get(format!("/api/status/{job_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_youtube_requires_url() {
    let app = test_app();
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(
            Request::post("/api/youtube")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"clips": 3}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "YouTube URL required");
}

#[tokio::test]
async fn test_upload_rejects_bad_extension() {
    let app = test_app();
    let router = create_router(app.state.clone());

    let boundary = "----testboundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"video\"; filename=\"script.sh\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         echo hi\r\n\
         --{boundary}--\r\n"
    );

    let response = router
        .oneshot(
            Request::post("/api/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "File type not allowed: .sh");
}

#[tokio::test]
async fn test_upload_stores_file() {
    let app = test_app();
    let router = create_router(app.state.clone());

    let boundary = "----testboundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"video\"; filename=\"my clip.mp4\"\r\n\
         Content-Type: video/mp4\r\n\r\n\
         fake video bytes\r\n\
         --{boundary}--\r\n"
    );

    let response = router
        .oneshot(
            Request::post("/api/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let filename = body["filename"].as_str().unwrap();
    assert!(filename.ends_with("_my_clip.mp4"));
    assert_eq!(body["file_id"].as_str().unwrap().len(), 8);
    assert_eq!(body["size"], 16);

    let stored = PathBuf::from(&app.state.config.upload_dir).join(filename);
    assert!(stored.exists());
}

#[tokio::test]
async fn test_upload_accepts_legacy_file_field() {
    let app = test_app();
    let router = create_router(app.state.clone());

    let boundary = "----testboundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"clip.mp4\"\r\n\
         Content-Type: video/mp4\r\n\r\n\
         fake video bytes\r\n\
         --{boundary}--\r\n"
    );

    let response = router
        .oneshot(
            Request::post("/api/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["filename"].as_str().unwrap().ends_with("_clip.mp4"));
}

#[tokio::test]
async fn test_download_missing_file() {
    let app = test_app();
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(
            Request::get("/api/download/some-job/clip_1_instagram.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_streams_clip() {
    let app = test_app();

    let clip_dir = PathBuf::from(&app.state.config.output_dir).join("job-1");
    std::fs::create_dir_all(&clip_dir).unwrap();
    std::fs::write(clip_dir.join("clip_1_instagram.mp4"), b"clip bytes").unwrap();

    let router = create_router(app.state.clone());
    let response = router
        .oneshot(
            Request::get("/api/download/job-1/clip_1_instagram.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "video/mp4"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("clip_1_instagram.mp4"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"clip bytes");
}
