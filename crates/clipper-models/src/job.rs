//! Job records and their status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length of the human-readable status message.
pub const MESSAGE_MAX_LEN: usize = 100;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job accepted, waiting to start
    #[default]
    Queued,
    /// Input is being fetched from a network source
    Downloading,
    /// Clips are being encoded
    Processing,
    /// Job finished with at least one clip produced
    Completed,
    /// Job failed
    Failed,
}

impl JobStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Downloading => "downloading",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-supplied options for a processing job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Number of clips to generate
    #[serde(default = "default_clips")]
    pub clips: u32,

    /// Target platform (e.g. "instagram", "tiktok", "youtube")
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Quality preset, recorded but not altering encode parameters
    #[serde(default = "default_quality")]
    pub quality: String,

    /// Minimum clip duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<u32>,

    /// Maximum clip duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,

    /// Audio enhancement flag (pass-through)
    #[serde(default)]
    pub enhance_audio: bool,

    /// Smart selection flag (pass-through)
    #[serde(default)]
    pub smart_selection: bool,
}

fn default_clips() -> u32 {
    3
}

fn default_platform() -> String {
    "instagram".to_string()
}

fn default_quality() -> String {
    "high".to_string()
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            clips: default_clips(),
            platform: default_platform(),
            quality: default_quality(),
            min_duration: None,
            max_duration: None,
            enhance_audio: false,
            smart_selection: false,
        }
    }
}

/// A produced clip artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFile {
    /// Artifact filename within the job's output directory
    pub filename: String,
    /// Download reference (`/api/download/{job_id}/{filename}`)
    pub url: String,
    /// Size in bytes
    pub size: u64,
}

/// A video processing job tracked end to end by a status record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Current status
    #[serde(default)]
    pub status: JobStatus,

    /// Progress percentage (0-100)
    #[serde(default)]
    pub progress: u8,

    /// Latest human-readable status message
    #[serde(default)]
    pub message: String,

    /// Input file path (set on creation for uploads, after fetch for downloads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,

    /// Source URL for network-sourced jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,

    /// Output directory for produced clips
    pub output_dir: String,

    /// Processing options
    pub options: ProcessOptions,

    /// Produced artifacts (empty until completed)
    #[serde(default)]
    pub output_files: Vec<OutputFile>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Completion timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new queued job for an input file already on disk.
    pub fn new(
        input_file: impl Into<String>,
        output_dir: impl Into<String>,
        options: ProcessOptions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            status: JobStatus::Queued,
            progress: 0,
            message: "Job queued".to_string(),
            input_file: Some(input_file.into()),
            youtube_url: None,
            output_dir: output_dir.into(),
            options,
            output_files: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Create a new queued job whose input must be downloaded first.
    pub fn new_download(
        url: impl Into<String>,
        output_dir: impl Into<String>,
        options: ProcessOptions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            status: JobStatus::Queued,
            progress: 0,
            message: "Job queued".to_string(),
            input_file: None,
            youtube_url: Some(url.into()),
            output_dir: output_dir.into(),
            options,
            output_files: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Check if the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Transition to `downloading`. No-op once terminal.
    pub fn start_downloading(&mut self) {
        if self.is_terminal() {
            return;
        }
        self.status = JobStatus::Downloading;
        self.progress = 5;
        self.set_message("Downloading video...");
        self.touch();
    }

    /// Transition to `processing` with the given baseline progress. No-op once terminal.
    pub fn start_processing(&mut self, baseline: u8) {
        if self.is_terminal() {
            return;
        }
        self.status = JobStatus::Processing;
        self.progress = baseline.min(100);
        self.set_message("Processing video...");
        self.touch();
    }

    /// Update progress. No-op once terminal.
    pub fn set_progress(&mut self, progress: u8) {
        if self.is_terminal() {
            return;
        }
        self.progress = progress.min(100);
        self.touch();
    }

    /// Update the status message, truncated to [`MESSAGE_MAX_LEN`]. No-op once terminal.
    pub fn set_message(&mut self, message: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        let mut message = message.into();
        if message.len() > MESSAGE_MAX_LEN {
            let mut cut = MESSAGE_MAX_LEN;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
        }
        self.message = message;
        self.touch();
    }

    /// Record the resolved input file path. No-op once terminal.
    pub fn set_input_file(&mut self, path: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.input_file = Some(path.into());
        self.touch();
    }

    /// Mark the job as completed with its produced artifacts. No-op once terminal.
    pub fn complete(&mut self, output_files: Vec<OutputFile>) {
        if self.is_terminal() {
            return;
        }
        self.set_message("Processing complete!");
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.output_files = output_files;
        self.completed_at = Some(Utc::now());
        self.touch();
    }

    /// Mark the job as failed. Resets progress to 0. No-op once terminal.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.set_message(message);
        self.status = JobStatus::Failed;
        self.progress = 0;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_creation() {
        let job = Job::new("uploads/in.mp4", "output/abc", ProcessOptions::default());
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert!(job.output_files.is_empty());
        assert!(job.completed_at.is_none());
        assert_eq!(job.options.clips, 3);
        assert_eq!(job.options.platform, "instagram");
    }

    #[test]
    fn test_job_state_transitions() {
        let mut job = Job::new("in.mp4", "out", ProcessOptions::default());

        job.start_processing(20);
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 20);

        job.set_progress(55);
        assert_eq!(job.progress, 55);

        job.complete(vec![OutputFile {
            filename: "clip_1_instagram.mp4".into(),
            url: "/api/download/x/clip_1_instagram.mp4".into(),
            size: 12345,
        }]);
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.completed_at.is_some());
        assert_eq!(job.output_files.len(), 1);
    }

    #[test]
    fn test_terminal_state_is_immutable() {
        let mut job = Job::new("in.mp4", "out", ProcessOptions::default());
        job.fail("Processing failed");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.progress, 0);

        job.start_processing(20);
        job.set_progress(80);
        job.complete(Vec::new());
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.progress, 0);
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_message_truncation() {
        let mut job = Job::new("in.mp4", "out", ProcessOptions::default());
        job.set_message("x".repeat(500));
        assert_eq!(job.message.len(), MESSAGE_MAX_LEN);
    }

    #[test]
    fn test_download_failure_message() {
        let mut job = Job::new_download("https://youtube.com/watch?v=abc", "out", ProcessOptions::default());
        job.start_downloading();
        assert_eq!(job.status, JobStatus::Downloading);
        assert_eq!(job.progress, 5);

        job.fail("Download failed");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.message, "Download failed");
    }

    #[test]
    fn test_job_serde_round_trip() {
        let mut job = Job::new("uploads/in.mp4", "output/abc", ProcessOptions::default());
        job.options.min_duration = Some(15);
        job.start_processing(20);

        let json = serde_json::to_string(&job).unwrap();
        let back: Job = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, job.id);
        assert_eq!(back.status, job.status);
        assert_eq!(back.progress, job.progress);
        assert_eq!(back.message, job.message);
        assert_eq!(back.input_file, job.input_file);
        assert_eq!(back.output_dir, job.output_dir);
        assert_eq!(back.options, job.options);
        assert_eq!(back.output_files, job.output_files);
    }
}
