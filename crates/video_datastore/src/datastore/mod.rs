use std::future::Future;

pub mod csv;
pub mod postgres;

use crate::{TranscriptUpdate, Video};

/// Contract the batch pipeline needs from a persistence sink.
///
/// `pending_videos` drives resumability: a row is pending while it has
/// neither a transcript nor a failure reason, so an interrupted run
/// picks up exactly where it stopped.
pub trait VideoStore {
    fn pending_videos(&self) -> impl Future<Output = anyhow::Result<Vec<Video>>> + Send;

    fn videos_with_transcript(&self) -> impl Future<Output = anyhow::Result<Vec<Video>>> + Send;

    fn update_transcript(
        &self,
        update: &TranscriptUpdate,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl<T: VideoStore + Send + Sync> VideoStore for &T {
    async fn pending_videos(&self) -> anyhow::Result<Vec<Video>> {
        (**self).pending_videos().await
    }

    async fn videos_with_transcript(&self) -> anyhow::Result<Vec<Video>> {
        (**self).videos_with_transcript().await
    }

    async fn update_transcript(&self, update: &TranscriptUpdate) -> anyhow::Result<()> {
        (**self).update_transcript(update).await
    }
}
