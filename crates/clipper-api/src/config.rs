//! Server configuration.

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory for uploaded and downloaded source videos
    pub upload_dir: String,
    /// Directory for produced clips (one subdirectory per job)
    pub output_dir: String,
    /// Path to the jobs JSON file
    pub jobs_file: String,
    /// Max upload body size in bytes
    pub max_upload_bytes: usize,
    /// Max jobs processing at once
    pub max_concurrent_jobs: usize,
    /// Wall-clock timeout for a single clip encode
    pub clip_timeout_secs: u64,
    /// Wall-clock timeout for a source video download
    pub download_timeout_secs: u64,
    /// Minimum acceptable clip size in bytes
    pub min_clip_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            upload_dir: "uploads".to_string(),
            output_dir: "output".to_string(),
            jobs_file: "jobs.json".to_string(),
            max_upload_bytes: 500 * 1024 * 1024, // 500MB
            max_concurrent_jobs: 2,
            clip_timeout_secs: 120,
            download_timeout_secs: 600,
            min_clip_bytes: 10 * 1024,
        }
    }
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("CLIPPER_HOST").unwrap_or(defaults.host),
            port: std::env::var("CLIPPER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            upload_dir: std::env::var("CLIPPER_UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            output_dir: std::env::var("CLIPPER_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            jobs_file: std::env::var("CLIPPER_JOBS_FILE").unwrap_or(defaults.jobs_file),
            max_upload_bytes: std::env::var("CLIPPER_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            max_concurrent_jobs: std::env::var("CLIPPER_MAX_CONCURRENT_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_concurrent_jobs),
            clip_timeout_secs: std::env::var("CLIPPER_CLIP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.clip_timeout_secs),
            download_timeout_secs: std::env::var("CLIPPER_DOWNLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.download_timeout_secs),
            min_clip_bytes: std::env::var("CLIPPER_MIN_CLIP_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_clip_bytes),
        }
    }
}
