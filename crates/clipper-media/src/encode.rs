//! Per-clip FFmpeg encoding.

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, warn};

use clipper_models::{is_vertical_platform, ClipPlan};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_video, VideoInfo};

/// Vertical 9:16 filter: fill the frame, then center-crop.
const VERTICAL_FILTER: &str =
    "scale=1080:1920:force_original_aspect_ratio=increase,crop=1080:1920,setsar=1:1";

/// Horizontal filter: 1080 wide, height follows the source aspect.
const HORIZONTAL_FILTER: &str = "scale=1080:-2";

/// Result of a successful clip encode.
#[derive(Debug, Clone)]
pub struct EncodeResult {
    /// Size of the output file in bytes
    pub size: u64,
}

/// Backend for probing and encoding video clips.
///
/// The production implementation shells out to ffmpeg/ffprobe; tests
/// substitute stubs so the job pipeline can run without the tools installed.
#[async_trait]
pub trait EncodeBackend: Send + Sync {
    /// Inspect a video file.
    async fn probe(&self, input: &Path) -> MediaResult<VideoInfo>;

    /// Encode a single clip from `input` to `output` per the plan.
    async fn encode_clip(
        &self,
        input: &Path,
        plan: &ClipPlan,
        output: &Path,
    ) -> MediaResult<EncodeResult>;
}

/// FFmpeg-based encode backend.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    /// Wall-clock timeout for a single clip encode
    clip_timeout_secs: u64,
    /// Minimum acceptable output size in bytes
    min_output_bytes: u64,
}

impl FfmpegEncoder {
    pub fn new(clip_timeout_secs: u64, min_output_bytes: u64) -> Self {
        Self {
            clip_timeout_secs,
            min_output_bytes,
        }
    }

    /// Pick the video filter for the target platform.
    fn filter_for_platform(platform: &str) -> &'static str {
        if is_vertical_platform(platform) {
            VERTICAL_FILTER
        } else {
            HORIZONTAL_FILTER
        }
    }

    /// Reject outputs below the size floor, removing the undersized file.
    async fn validate_output(&self, output: &Path) -> MediaResult<u64> {
        let metadata = tokio::fs::metadata(output).await.map_err(|_| {
            MediaError::encode_failed("FFmpeg produced no output file", None, None)
        })?;

        let size = metadata.len();
        if size < self.min_output_bytes {
            warn!(
                path = %output.display(),
                size,
                "Discarding undersized clip output"
            );
            let _ = tokio::fs::remove_file(output).await;
            return Err(MediaError::OutputTooSmall {
                path: output.to_path_buf(),
                size,
            });
        }

        Ok(size)
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new(120, 10 * 1024)
    }
}

#[async_trait]
impl EncodeBackend for FfmpegEncoder {
    async fn probe(&self, input: &Path) -> MediaResult<VideoInfo> {
        probe_video(input).await
    }

    async fn encode_clip(
        &self,
        input: &Path,
        plan: &ClipPlan,
        output: &Path,
    ) -> MediaResult<EncodeResult> {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        debug!(
            input = %input.display(),
            output = %output.display(),
            start = plan.start,
            duration = plan.duration,
            platform = %plan.platform,
            "Encoding clip"
        );

        let cmd = FfmpegCommand::new(input, output)
            .seek(plan.start)
            .duration(plan.duration)
            .video_filter(Self::filter_for_platform(&plan.platform))
            .video_codec("libx264")
            .preset("medium")
            .crf(23)
            .audio_codec("aac")
            .audio_bitrate("128k")
            .output_args(["-movflags", "+faststart", "-avoid_negative_ts", "make_zero"]);

        let runner = FfmpegRunner::new().with_timeout(self.clip_timeout_secs);
        let clip_index = plan.index;
        let total_ms = (plan.duration * 1000.0) as i64;
        runner
            .run_with_progress(&cmd, move |p| {
                debug!(
                    clip = clip_index,
                    percent = p.percentage(total_ms) as u32,
                    speed = p.speed,
                    "Encode progress"
                );
            })
            .await?;

        let size = self.validate_output(output).await?;
        Ok(EncodeResult { size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn test_filter_selection() {
        assert_eq!(FfmpegEncoder::filter_for_platform("instagram"), VERTICAL_FILTER);
        assert_eq!(FfmpegEncoder::filter_for_platform("TikTok"), VERTICAL_FILTER);
        assert_eq!(FfmpegEncoder::filter_for_platform("youtube"), VERTICAL_FILTER);
        assert_eq!(FfmpegEncoder::filter_for_platform("twitter"), HORIZONTAL_FILTER);
        assert_eq!(FfmpegEncoder::filter_for_platform("vimeo"), HORIZONTAL_FILTER);
    }

    #[tokio::test]
    async fn test_validate_output_removes_undersized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip_1_instagram.mp4");
        let mut file = tokio::fs::File::create(&path).await.unwrap();
        file.write_all(b"tiny").await.unwrap();
        drop(file);

        let encoder = FfmpegEncoder::new(120, 10 * 1024);
        let err = encoder.validate_output(&path).await.unwrap_err();
        assert!(matches!(err, MediaError::OutputTooSmall { size: 4, .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_validate_output_accepts_large_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip_1_twitter.mp4");
        tokio::fs::write(&path, vec![0u8; 20 * 1024]).await.unwrap();

        let encoder = FfmpegEncoder::new(120, 10 * 1024);
        let size = encoder.validate_output(&path).await.unwrap();
        assert_eq!(size, 20 * 1024);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_validate_output_missing_file() {
        let encoder = FfmpegEncoder::default();
        let err = encoder
            .validate_output(Path::new("/nonexistent/clip.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::EncodeFailed { .. }));
    }
}
