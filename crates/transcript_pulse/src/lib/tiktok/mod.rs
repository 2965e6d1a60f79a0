pub mod captions;
pub mod fetcher;
pub mod media;
pub mod metadata;

use std::future::Future;

use video_datastore::Transcripts;

use crate::error::FetchError;
use media::DownloadedAudio;
use metadata::VideoMetadata;

/// Fetches and classifies raw video metadata for one source URL.
pub trait VideoFetcher {
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<VideoMetadata, FetchError>> + Send;
}

/// Extracts embedded caption tracks into per-language transcripts.
/// Infallible by contract: an empty result means "no captions", and
/// per-track problems are logged and skipped internally.
pub trait CaptionSource {
    fn extract(&self, metadata: &VideoMetadata) -> impl Future<Output = Transcripts> + Send;
}

/// Acquires the video's audio track as a local WAV artifact for the
/// cloud fallback.
pub trait AudioFetcher {
    fn fetch_audio(
        &self,
        metadata: &VideoMetadata,
    ) -> impl Future<Output = anyhow::Result<DownloadedAudio>> + Send;
}
