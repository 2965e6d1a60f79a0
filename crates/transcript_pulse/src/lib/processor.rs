pub mod builder;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use video_datastore::{TranscriptUpdate, VideoStore};

use crate::{
    resolver::{Resolution, ResolveTranscript, NO_TRANSCRIPT_REASON},
    stats::StatCollector,
};

/// Failure reason recorded for videos that can no longer be reached.
pub const PRIVATE_REASON: &str = "Video is private or has been removed";

/// Final accounting for one batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Rows that still needed a transcript when the run started.
    pub total: usize,
    /// Rows actually worked on before the run ended or was
    /// interrupted.
    pub processed: usize,
    pub stats: StatCollector,
}

enum RowStat {
    Success,
    Private,
    Failure,
}

/// Walks every pending row through the resolver and writes each
/// outcome back before moving on, so an interrupted run leaves
/// nothing half-done.
pub struct BatchProcessor<D, R> {
    datastore: D,
    resolver: R,
    show_progress: bool,
}

impl<D, R> BatchProcessor<D, R>
where
    D: VideoStore + Send + Sync,
    R: ResolveTranscript + Send + Sync,
{
    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}] {msg}")
        {
            bar.set_style(style);
        }
        bar
    }

    #[tracing::instrument(skip_all)]
    pub async fn run(&self, cancel: CancellationToken) -> anyhow::Result<BatchReport> {
        let pending = self
            .datastore
            .pending_videos()
            .await
            .context("failed to load pending videos")?;

        let total = pending.len();
        let mut stats = StatCollector::new();
        let mut processed = 0;
        let bar = self.progress_bar(total);

        tracing::info!(total, "Starting batch run");

        for video in pending {
            if cancel.is_cancelled() {
                tracing::warn!(
                    processed,
                    remaining = total - processed,
                    "Interrupted; stopping before the next video"
                );
                break;
            }

            bar.set_message(progress_message(&video.url, &stats));
            let resolution = self.resolver.resolve(&video.url).await;

            // an empty resolution gets its reason persisted but is
            // counted in no bucket
            let (update, stat) = match resolution {
                Resolution::Resolved { transcripts, .. } if transcripts.is_empty() => (
                    TranscriptUpdate::failed(video.id, NO_TRANSCRIPT_REASON),
                    None,
                ),
                Resolution::Resolved {
                    transcripts,
                    source,
                } => {
                    tracing::debug!(video_url = video.url, source = ?source, "Transcript resolved");
                    (
                        TranscriptUpdate::from_transcripts(video.id, &transcripts),
                        Some(RowStat::Success),
                    )
                }
                Resolution::PrivateOrRemoved => (
                    TranscriptUpdate::failed(video.id, PRIVATE_REASON),
                    Some(RowStat::Private),
                ),
                Resolution::Failed(reason) => (
                    TranscriptUpdate::failed(video.id, &reason),
                    Some(RowStat::Failure),
                ),
            };

            // a sink failure downgrades the row to a failure so the
            // summary never claims more than what was persisted
            let stat = match self.datastore.update_transcript(&update).await {
                Ok(()) => stat,
                Err(error) => {
                    tracing::error!(
                        video_url = video.url,
                        error = ?error,
                        "Failed to persist outcome; continuing with the next video"
                    );
                    Some(RowStat::Failure)
                }
            };

            match stat {
                Some(RowStat::Success) => stats.record_success(),
                Some(RowStat::Private) => stats.record_private(&video.url),
                Some(RowStat::Failure) => stats.record_failure(&video.url),
                None => {}
            }

            processed += 1;
            bar.inc(1);
        }

        bar.finish_and_clear();
        tracing::info!(
            total,
            processed,
            successes = stats.successes(),
            "Batch run finished"
        );

        Ok(BatchReport {
            total,
            processed,
            stats,
        })
    }
}

/// The per-row progress line: the URL being worked on plus the
/// running counts.
fn progress_message(url: &str, stats: &StatCollector) -> String {
    format!(
        "{url} | {} succeeded, {} private, {} failed",
        stats.successes(),
        stats.private_videos().len(),
        stats.failed_requests().len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_message_carries_the_running_counts() {
        let mut stats = StatCollector::new();
        stats.record_success();
        stats.record_success();
        stats.record_private("https://www.tiktok.com/@a/video/1");
        stats.record_failure("https://www.tiktok.com/@b/video/2");
        stats.record_failure("https://www.tiktok.com/@c/video/3");

        let message = progress_message("https://www.tiktok.com/@d/video/4", &stats);
        assert_eq!(
            message,
            "https://www.tiktok.com/@d/video/4 | 2 succeeded, 1 private, 2 failed"
        );
    }
}
