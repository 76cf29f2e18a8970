//! External tool plumbing for the video clipper backend.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeout support
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe video inspection
//! - The per-clip encode invoker behind the [`EncodeBackend`] trait
//! - yt-dlp downloads behind the [`MediaDownloader`] trait

pub mod command;
pub mod download;
pub mod encode;
pub mod error;
pub mod probe;
pub mod progress;

#[cfg(test)]
pub(crate) mod test_support;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use download::{MediaDownloader, YtDlpDownloader};
pub use encode::{EncodeBackend, EncodeResult, FfmpegEncoder};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_video, VideoInfo};
pub use progress::FfmpegProgress;
