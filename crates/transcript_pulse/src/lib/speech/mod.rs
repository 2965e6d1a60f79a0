//! Cloud speech-translation fallback. A recognition session runs as a
//! task that publishes [`RecognitionEvent`]s on a bounded channel; the
//! consumer drains the channel until a terminal event arrives and
//! folds recognized segments into per-language transcripts.

pub mod azure;

use std::future::Future;

use tokio::sync::mpsc;
use video_datastore::{Language, Transcripts};

use crate::tiktok::media::DownloadedAudio;

pub use azure::{AzureSpeechClient, AzureSpeechConfig, AzureSpeechError};

/// Events emitted by a recognition session, in recognition order.
/// Every session ends with exactly one terminal event, `Stopped` or
/// `Canceled`.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// One recognized segment with its translations.
    Recognized { translations: Vec<(Language, String)> },
    /// The session ended prematurely. Segments recognized before the
    /// cancellation remain valid.
    Canceled { reason: String },
    /// The session consumed the whole audio stream.
    Stopped,
}

/// Outcome of one drained recognition session.
#[derive(Debug, Default)]
pub struct CloudTranscript {
    pub transcripts: Transcripts,
    pub recognized_events: usize,
    pub canceled: Option<String>,
}

/// Queue depth between the session task and the consumer. Small on
/// purpose; segments arrive at speech pace, not network pace.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Consumes events until a terminal event or channel closure, folding
/// recognized segments into transcripts in arrival order.
pub async fn drain_events(mut events: mpsc::Receiver<RecognitionEvent>) -> CloudTranscript {
    let mut result = CloudTranscript::default();

    while let Some(event) = events.recv().await {
        match event {
            RecognitionEvent::Recognized { translations } => {
                result.recognized_events += 1;
                for (language, text) in translations {
                    tracing::info!(%language, text, "Recognized segment");
                    result.transcripts.append_fragment(language, &text);
                }
            }
            RecognitionEvent::Canceled { reason } => {
                result.canceled = Some(reason);
                break;
            }
            RecognitionEvent::Stopped => break,
        }
    }

    result
}

/// Produces translated transcripts for a local audio artifact.
pub trait SpeechTranslator {
    fn translate(
        &self,
        audio: &DownloadedAudio,
    ) -> impl Future<Output = anyhow::Result<CloudTranscript>> + Send;
}
