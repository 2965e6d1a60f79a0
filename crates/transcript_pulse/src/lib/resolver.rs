use std::future::Future;

use video_datastore::{TranscriptSource, Transcripts};

use crate::{
    error::FetchError,
    speech::SpeechTranslator,
    tiktok::{metadata::VideoMetadata, AudioFetcher, CaptionSource, VideoFetcher},
};

/// Failure reason recorded when every source came back empty-handed
/// without an actual error.
pub const NO_TRANSCRIPT_REASON: &str = "No transcript available from any source";

/// Terminal outcome of resolving one video URL.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Transcript acquisition finished. `source` records where the
    /// text came from; `None` means no source produced any text,
    /// which leaves the transcripts empty.
    Resolved {
        transcripts: Transcripts,
        source: Option<TranscriptSource>,
    },
    /// The video is private or has been removed; retrying will not
    /// help.
    PrivateOrRemoved,
    /// Something went wrong along the way; worth retrying in a later
    /// run.
    Failed(String),
}

/// Drives one URL through the full acquisition pipeline.
pub trait ResolveTranscript {
    fn resolve(&self, url: &str) -> impl Future<Output = Resolution> + Send;
}

/// Cloud fallback stage, present only when credentials were supplied
/// and the operator did not disable it.
pub struct CloudFallback<A, T> {
    pub audio: A,
    pub speech: T,
}

/// Transcript acquisition pipeline: fetch metadata, try embedded
/// captions first, and only when none exist hand the audio to the
/// cloud speech service.
pub struct TranscriptResolver<F, C, A, T> {
    fetcher: F,
    captions: C,
    fallback: Option<CloudFallback<A, T>>,
}

impl<F, C, A, T> TranscriptResolver<F, C, A, T>
where
    F: VideoFetcher + Send + Sync,
    C: CaptionSource + Send + Sync,
    A: AudioFetcher + Send + Sync,
    T: SpeechTranslator + Send + Sync,
{
    pub fn new(fetcher: F, captions: C, fallback: Option<CloudFallback<A, T>>) -> Self {
        TranscriptResolver {
            fetcher,
            captions,
            fallback,
        }
    }

    async fn cloud_transcripts(&self, metadata: &VideoMetadata) -> Resolution {
        let Some(fallback) = &self.fallback else {
            tracing::debug!(video_url = metadata.url(), "Cloud fallback disabled");
            return Resolution::Resolved {
                transcripts: Transcripts::new(),
                source: None,
            };
        };

        let audio = match fallback.audio.fetch_audio(metadata).await {
            Ok(audio) => audio,
            Err(error) => return Resolution::Failed(format!("audio acquisition failed: {error:#}")),
        };

        match fallback.speech.translate(&audio).await {
            Ok(cloud) => {
                tracing::debug!(
                    video_url = metadata.url(),
                    source = %TranscriptSource::CloudSpeech,
                    recognized_events = cloud.recognized_events,
                    "Cloud recognition finished"
                );
                // a session that produced no segments has no provenance
                let source =
                    (cloud.recognized_events > 0).then_some(TranscriptSource::CloudSpeech);
                Resolution::Resolved {
                    transcripts: cloud.transcripts,
                    source,
                }
            }
            Err(error) => Resolution::Failed(format!("speech recognition failed: {error:#}")),
        }
    }
}

impl<F, C, A, T> ResolveTranscript for TranscriptResolver<F, C, A, T>
where
    F: VideoFetcher + Send + Sync,
    C: CaptionSource + Send + Sync,
    A: AudioFetcher + Send + Sync,
    T: SpeechTranslator + Send + Sync,
{
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, url: &str) -> Resolution {
        let metadata = match self.fetcher.fetch(url).await {
            Ok(metadata) => metadata,
            Err(FetchError::UnavailableVideo) => return Resolution::PrivateOrRemoved,
            Err(error) => return Resolution::Failed(error.to_string()),
        };

        tracing::debug!(
            video_url = url,
            description = metadata.description().unwrap_or(""),
            is_ad = metadata.is_ad(),
            original_sound = metadata.has_original_sound(),
            suggested_words = ?metadata.suggested_words(),
            "Video metadata fetched"
        );

        let captions = self.captions.extract(&metadata).await;
        if !captions.is_empty() {
            tracing::debug!(
                video_url = url,
                source = %TranscriptSource::Platform,
                "Resolved from embedded captions"
            );
            return Resolution::Resolved {
                transcripts: captions,
                source: Some(TranscriptSource::Platform),
            };
        }

        tracing::debug!(video_url = url, "No embedded captions; trying cloud fallback");
        self.cloud_transcripts(&metadata).await
    }
}
