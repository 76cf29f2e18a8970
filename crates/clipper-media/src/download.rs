//! Source video download via yt-dlp.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// yt-dlp format selector: prefer mp4 video + m4a audio, fall back to best.
const FORMAT_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Extensions yt-dlp may leave behind when merging falls back.
const DOWNLOAD_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm"];

/// Downloader for remote source videos.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Download the video at `url` into `dest_dir`, returning the file path.
    async fn download(&self, url: &str, dest_dir: &Path) -> MediaResult<PathBuf>;
}

/// yt-dlp based downloader.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    /// Wall-clock timeout for the whole download
    timeout_secs: u64,
}

impl YtDlpDownloader {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    /// Find the downloaded file when the requested output name was not used.
    async fn find_downloaded_file(dest_dir: &Path) -> MediaResult<Option<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dest_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase());
            if let Some(ext) = ext {
                if DOWNLOAD_EXTENSIONS.contains(&ext.as_str()) {
                    return Ok(Some(path));
                }
            }
        }
        Ok(None)
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new(600)
    }
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    async fn download(&self, url: &str, dest_dir: &Path) -> MediaResult<PathBuf> {
        which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

        tokio::fs::create_dir_all(dest_dir).await?;
        let output_path = dest_dir.join("video.mp4");

        debug!(url, dest = %dest_dir.display(), "Starting yt-dlp download");

        // kill_on_drop: tokio leaves the child running when the output
        // future is dropped, so without it a timed-out yt-dlp would keep
        // downloading as an orphan.
        let run = Command::new("yt-dlp")
            .arg("-f")
            .arg(FORMAT_SELECTOR)
            .arg("-o")
            .arg(&output_path)
            .arg("--no-playlist")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(
            std::time::Duration::from_secs(self.timeout_secs),
            run,
        )
        .await
        .map_err(|_| {
            warn!(url, "yt-dlp timed out after {} seconds", self.timeout_secs);
            MediaError::Timeout(self.timeout_secs)
        })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::download_failed(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if output_path.exists() {
            info!(url, path = %output_path.display(), "Download complete");
            return Ok(output_path);
        }

        // Merging can change the container; scan for whatever landed.
        if let Some(found) = Self::find_downloaded_file(dest_dir).await? {
            info!(url, path = %found.display(), "Download complete");
            return Ok(found);
        }

        Err(MediaError::download_failed(
            "yt-dlp reported success but no video file was found",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_downloaded_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), b"x").await.unwrap();
        assert!(YtDlpDownloader::find_downloaded_file(dir.path())
            .await
            .unwrap()
            .is_none());

        tokio::fs::write(dir.path().join("video.mkv"), b"x").await.unwrap();
        let found = YtDlpDownloader::find_downloaded_file(dir.path())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.extension().unwrap(), "mkv");
    }

    #[tokio::test]
    async fn test_download_times_out_on_hung_tool() {
        let dir = tempfile::tempdir().unwrap();
        let _tool = crate::test_support::FakeTool::install(dir.path(), "yt-dlp", "#!/bin/sh\nsleep 5\n");

        let dest = dir.path().join("dest");
        let downloader = YtDlpDownloader::new(1);
        let err = downloader
            .download("https://youtube.com/watch?v=abc", &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Timeout(1)));
    }
}
