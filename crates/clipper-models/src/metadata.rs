//! Per-run metadata written next to the produced clips.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one successfully encoded clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipOutcome {
    /// Artifact filename
    pub filename: String,
    /// Start offset in seconds
    pub start_time: f64,
    /// Duration in seconds
    pub duration: f64,
    /// Artifact size in bytes
    pub size: u64,
}

/// Planner and encode outcomes for a job, persisted as `metadata.json`
/// in the job's output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Input file name
    pub input_file: String,
    /// Input duration in seconds
    pub input_duration: f64,
    /// Target platform
    pub platform: String,
    /// Quality preset as requested
    pub quality: String,
    /// Clips requested by the user
    pub clips_requested: u32,
    /// Clips actually produced
    pub clips_generated: u32,
    /// Resolved target clip duration in seconds
    pub clip_duration: f64,
    /// Total bytes across produced clips
    pub total_size: u64,
    /// Per-clip outcomes
    pub clips: Vec<ClipOutcome>,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
}

impl RunMetadata {
    /// Build metadata from the encode outcomes.
    pub fn new(
        input_file: impl Into<String>,
        input_duration: f64,
        platform: impl Into<String>,
        quality: impl Into<String>,
        clips_requested: u32,
        clip_duration: f64,
        clips: Vec<ClipOutcome>,
    ) -> Self {
        let total_size = clips.iter().map(|c| c.size).sum();
        Self {
            input_file: input_file.into(),
            input_duration,
            platform: platform.into(),
            quality: quality.into(),
            clips_requested,
            clips_generated: clips.len() as u32,
            clip_duration,
            total_size,
            clips,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_totals() {
        let meta = RunMetadata::new(
            "video.mp4",
            600.0,
            "instagram",
            "high",
            3,
            30.0,
            vec![
                ClipOutcome {
                    filename: "clip_1_instagram.mp4".into(),
                    start_time: 0.0,
                    duration: 30.0,
                    size: 1000,
                },
                ClipOutcome {
                    filename: "clip_3_instagram.mp4".into(),
                    start_time: 540.0,
                    duration: 30.0,
                    size: 2000,
                },
            ],
        );

        assert_eq!(meta.clips_generated, 2);
        assert_eq!(meta.clips_requested, 3);
        assert_eq!(meta.total_size, 3000);
    }
}
