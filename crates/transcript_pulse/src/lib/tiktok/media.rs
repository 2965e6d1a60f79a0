use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::TempDir;
use tokio::{fs, process::Command};

use crate::tiktok::{metadata::VideoMetadata, AudioFetcher};

/// A WAV file on disk ready for speech recognition. Holds its scratch
/// directory alive; dropping the value removes both the downloaded
/// video and the extracted audio.
pub struct DownloadedAudio {
    wav_path: PathBuf,
    _tmp: Option<TempDir>,
}

impl DownloadedAudio {
    /// Wraps an existing WAV file without taking ownership of its
    /// lifetime. Used by tests that point at fixture files.
    pub fn untracked(wav_path: impl Into<PathBuf>) -> Self {
        DownloadedAudio {
            wav_path: wav_path.into(),
            _tmp: None,
        }
    }

    pub fn wav_path(&self) -> &Path {
        &self.wav_path
    }
}

/// Downloads a video's media file and extracts its audio track as
/// 16 kHz mono WAV via ffmpeg, into a per-video temp directory.
pub struct MediaDownloader {
    client: reqwest::Client,
}

impl MediaDownloader {
    pub fn new(client: reqwest::Client) -> Self {
        MediaDownloader { client }
    }

    async fn download_video(&self, url: &str, dest: &Path) -> anyhow::Result<()> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::REFERER, "https://www.tiktok.com/")
            .send()
            .await
            .context("media download request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("media download returned status {}", response.status());
        }

        let bytes = response
            .bytes()
            .await
            .context("failed to read media download body")?;
        if bytes.is_empty() {
            anyhow::bail!("media download returned an empty body");
        }

        fs::write(dest, &bytes)
            .await
            .with_context(|| format!("failed to write {}", dest.display()))
    }

    async fn extract_wav(&self, video: &Path, wav: &Path) -> anyhow::Result<()> {
        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(video)
            .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
            .arg(wav)
            .output()
            .await
            .context("failed to spawn ffmpeg; is it installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg exited with {}: {}", output.status, stderr.trim());
        }

        Ok(())
    }
}

impl AudioFetcher for MediaDownloader {
    #[tracing::instrument(skip_all, fields(video_url = metadata.url()))]
    async fn fetch_audio(&self, metadata: &VideoMetadata) -> anyhow::Result<DownloadedAudio> {
        let download_url = metadata
            .download_url()
            .context("video metadata carries no download address")?;

        let tmp = TempDir::new().context("failed to create scratch directory")?;
        let video_path = tmp.path().join("video.mp4");
        let wav_path = tmp.path().join("audio.wav");

        self.download_video(download_url, &video_path).await?;
        tracing::debug!(path = %video_path.display(), "Video downloaded");

        self.extract_wav(&video_path, &wav_path).await?;
        tracing::debug!(path = %wav_path.display(), "Audio track extracted");

        Ok(DownloadedAudio {
            wav_path,
            _tmp: Some(tmp),
        })
    }
}
