//! Job submission handlers.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use clipper_models::{Job, ProcessOptions};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::supervisor;

/// Body of POST /api/process.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    /// Path of a previously uploaded video
    pub filepath: Option<String>,
    #[serde(flatten)]
    pub options: ProcessOptions,
}

/// Body of POST /api/youtube.
#[derive(Debug, Deserialize)]
pub struct YoutubeRequest {
    /// Source video URL
    pub url: Option<String>,
    #[serde(flatten)]
    pub options: ProcessOptions,
}

fn validate_options(options: &ProcessOptions) -> ApiResult<()> {
    if options.clips == 0 {
        return Err(ApiError::bad_request("Clip count must be positive"));
    }
    Ok(())
}

fn job_output_dir(state: &AppState, job: &Job) -> PathBuf {
    Path::new(&state.config.output_dir).join(job.id.as_str())
}

fn accepted_response(job: &Job) -> Json<Value> {
    Json(json!({
        "job_id": job.id,
        "status": job.status,
        "status_url": format!("/api/status/{}", job.id),
    }))
}

/// POST /api/process — start processing an uploaded video.
pub async fn process_video(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<Json<Value>> {
    let filepath = request
        .filepath
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("No video file specified"))?;

    if !Path::new(&filepath).exists() {
        return Err(ApiError::bad_request("Video file not found"));
    }
    validate_options(&request.options)?;

    let mut job = Job::new(filepath, "", request.options);
    job.output_dir = job_output_dir(&state, &job).to_string_lossy().to_string();

    info!(job_id = %job.id, input = ?job.input_file, "Accepted processing job");
    state.store.put(job.clone()).await?;
    supervisor::spawn_job(state, job.id.clone());

    Ok(accepted_response(&job))
}

/// POST /api/youtube — download a video from a URL, then process it.
pub async fn process_youtube(
    State(state): State<AppState>,
    Json(request): Json<YoutubeRequest>,
) -> ApiResult<Json<Value>> {
    let url = request
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("YouTube URL required"))?;

    validate_options(&request.options)?;

    let mut job = Job::new_download(url, "", request.options);
    job.output_dir = job_output_dir(&state, &job).to_string_lossy().to_string();

    info!(job_id = %job.id, url = ?job.youtube_url, "Accepted download job");
    state.store.put(job.clone()).await?;
    supervisor::spawn_download_job(state, job.id.clone());

    Ok(accepted_response(&job))
}
