//! Application state.

use std::sync::Arc;
use tokio::sync::Semaphore;

use clipper_media::{EncodeBackend, FfmpegEncoder, MediaDownloader, YtDlpDownloader};
use clipper_store::JobStore;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<AppConfig>,
    /// Job store
    pub store: Arc<JobStore>,
    /// Encode backend
    pub encoder: Arc<dyn EncodeBackend>,
    /// Source video downloader
    pub downloader: Arc<dyn MediaDownloader>,
    /// Admission control for concurrent job processing
    pub job_permits: Arc<Semaphore>,
}

impl AppState {
    /// Create application state, ensuring working directories exist.
    pub async fn new(config: AppConfig) -> ApiResult<Self> {
        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to create upload dir: {e}")))?;
        tokio::fs::create_dir_all(&config.output_dir)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to create output dir: {e}")))?;

        let store = Arc::new(JobStore::new(&config.jobs_file));
        let encoder = Arc::new(FfmpegEncoder::new(
            config.clip_timeout_secs,
            config.min_clip_bytes,
        ));
        let downloader = Arc::new(YtDlpDownloader::new(config.download_timeout_secs));
        let job_permits = Arc::new(Semaphore::new(config.max_concurrent_jobs));

        Ok(Self {
            config: Arc::new(config),
            store,
            encoder,
            downloader,
            job_permits,
        })
    }

    /// Create state with injected backends.
    pub fn with_backends(
        config: AppConfig,
        store: Arc<JobStore>,
        encoder: Arc<dyn EncodeBackend>,
        downloader: Arc<dyn MediaDownloader>,
    ) -> Self {
        let job_permits = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        Self {
            config: Arc::new(config),
            store,
            encoder,
            downloader,
            job_permits,
        }
    }
}
