//! Job supervisor: drives one job from queued to a terminal state.
//!
//! Each accepted job gets its own tokio task. The task waits for an
//! admission permit, then walks the job through download (when sourced
//! from a URL), probe, plan, per-clip encode, and completion. Every
//! observable state change goes through the store so status polling
//! always sees a consistent record.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

use clipper_media::MediaError;
use clipper_models::{plan_clips, ClipOutcome, JobId, OutputFile, PlanError, RunMetadata};
use clipper_store::StoreError;

use crate::state::AppState;

/// Progress reached once the input is ready and encoding begins.
const PROCESSING_BASELINE: u8 = 20;

/// Share of the progress bar covered by the encode loop.
const ENCODE_SPAN: u8 = 70;

/// Errors that end a job in the `failed` state.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Input file is missing")]
    MissingInput,

    #[error("Failed to analyze video: {0}")]
    Probe(MediaError),

    #[error("{0}")]
    Plan(#[from] PlanError),

    #[error("Download failed")]
    Download(#[source] MediaError),

    #[error("No clips could be generated")]
    NoClips,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Spawn the supervisor task for an upload-sourced job.
pub fn spawn_job(state: AppState, job_id: JobId) {
    tokio::spawn(async move {
        run_job(state, job_id).await;
    });
}

/// Spawn the supervisor task for a URL-sourced job.
pub fn spawn_download_job(state: AppState, job_id: JobId) {
    tokio::spawn(async move {
        run_download_job(state, job_id).await;
    });
}

/// Drive an upload-sourced job to a terminal state.
pub async fn run_job(state: AppState, job_id: JobId) {
    let permit = match state.job_permits.clone().acquire_owned().await {
        Ok(p) => p,
        Err(_) => return, // semaphore closed, server shutting down
    };

    if let Err(e) = process_job(&state, &job_id).await {
        fail_job(&state, &job_id, &e).await;
    }

    drop(permit);
}

/// Drive a URL-sourced job: download first, then process.
pub async fn run_download_job(state: AppState, job_id: JobId) {
    let permit = match state.job_permits.clone().acquire_owned().await {
        Ok(p) => p,
        Err(_) => return,
    };

    let result = async {
        download_input(&state, &job_id).await?;
        process_job(&state, &job_id).await
    }
    .await;

    if let Err(e) = result {
        fail_job(&state, &job_id, &e).await;
    }

    drop(permit);
}

/// Record the failure on the job. Terminal guards in the model make this
/// a no-op if the job somehow already finished.
async fn fail_job(state: &AppState, job_id: &JobId, err: &JobError) {
    error!(job_id = %job_id, error = %err, "Job failed");
    let message = err.to_string();
    if let Err(e) = state.store.update(job_id, |job| job.fail(&message)).await {
        error!(job_id = %job_id, error = %e, "Failed to persist job failure");
    }
}

/// Fetch the source video for a URL-sourced job.
async fn download_input(state: &AppState, job_id: &JobId) -> Result<(), JobError> {
    let job = state
        .store
        .update(job_id, |job| job.start_downloading())
        .await?
        .ok_or(JobError::MissingInput)?;

    let url = job.youtube_url.clone().ok_or(JobError::MissingInput)?;
    let dest_dir = Path::new(&state.config.upload_dir).join(job_id.as_str());

    info!(job_id = %job_id, url = %url, "Downloading source video");

    let path = state
        .downloader
        .download(&url, &dest_dir)
        .await
        .map_err(JobError::Download)?;

    state
        .store
        .update(job_id, |job| {
            job.set_input_file(path.to_string_lossy().to_string());
        })
        .await?;

    Ok(())
}

/// Probe, plan, encode, and complete a job whose input file exists.
async fn process_job(state: &AppState, job_id: &JobId) -> Result<(), JobError> {
    let Some(job) = state.store.get(job_id).await? else {
        warn!(job_id = %job_id, "Job vanished before processing started");
        return Ok(());
    };

    let input = PathBuf::from(job.input_file.as_deref().ok_or(JobError::MissingInput)?);
    let options = job.options.clone();

    let info = state
        .encoder
        .probe(&input)
        .await
        .map_err(JobError::Probe)?;

    info!(
        job_id = %job_id,
        duration = info.duration,
        width = info.width,
        height = info.height,
        "Probed input video"
    );

    let plans = plan_clips(
        info.duration,
        options.clips,
        options.min_duration,
        options.max_duration,
        &options.platform,
    )?;

    state
        .store
        .update(job_id, |job| job.start_processing(PROCESSING_BASELINE))
        .await?;

    let output_dir = PathBuf::from(&job.output_dir);
    tokio::fs::create_dir_all(&output_dir).await?;

    let total = plans.len();
    let mut outcomes = Vec::new();

    for plan in &plans {
        let clip_number = plan.index + 1;
        let filename = format!("clip_{}_{}.mp4", clip_number, plan.platform);
        let output_path = output_dir.join(&filename);

        state
            .store
            .update(job_id, |job| {
                job.set_message(format!("Encoding clip {clip_number}/{total}"));
            })
            .await?;

        match state.encoder.encode_clip(&input, plan, &output_path).await {
            Ok(result) => {
                outcomes.push(ClipOutcome {
                    filename,
                    start_time: plan.start,
                    duration: plan.duration,
                    size: result.size,
                });
            }
            Err(e) => {
                // One bad clip does not sink the job.
                warn!(
                    job_id = %job_id,
                    clip = clip_number,
                    error = %e,
                    "Clip encode failed, skipping"
                );
            }
        }

        let progress =
            PROCESSING_BASELINE + (ENCODE_SPAN as usize * clip_number / total) as u8;
        state
            .store
            .update(job_id, |job| job.set_progress(progress))
            .await?;
    }

    let clip_duration = plans.first().map(|p| p.duration).unwrap_or(0.0);
    let metadata = RunMetadata::new(
        input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        info.duration,
        &options.platform,
        &options.quality,
        options.clips,
        clip_duration,
        outcomes,
    );
    write_metadata(&output_dir, &metadata).await;

    let output_files = scan_output_dir(&output_dir, job_id).await?;
    if output_files.is_empty() {
        return Err(JobError::NoClips);
    }

    info!(
        job_id = %job_id,
        clips = output_files.len(),
        "Job completed"
    );
    state
        .store
        .update(job_id, |job| job.complete(output_files))
        .await?;

    Ok(())
}

/// Write `metadata.json` next to the clips. Failure here is logged but
/// never fails the job.
async fn write_metadata(output_dir: &Path, metadata: &RunMetadata) {
    let path = output_dir.join("metadata.json");
    let result = async {
        let bytes = serde_json::to_vec_pretty(metadata)?;
        tokio::fs::write(&path, bytes).await?;
        Ok::<_, std::io::Error>(())
    }
    .await;

    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "Failed to write run metadata");
    }
}

/// List produced clips in the output directory, sorted by filename.
async fn scan_output_dir(output_dir: &Path, job_id: &JobId) -> Result<Vec<OutputFile>, JobError> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(output_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("mp4") {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let size = entry.metadata().await?.len();
        files.push(OutputFile {
            filename: filename.to_string(),
            url: format!("/api/download/{}/{}", job_id, filename),
            size,
        });
    }

    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(files)
}
