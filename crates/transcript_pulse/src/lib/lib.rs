mod error;
mod processor;
mod resolver;
mod stats;

pub mod speech;
pub mod tiktok;
pub mod tracing;

pub use error::FetchError;
pub use processor::{builder::BatchProcessorBuilder, BatchProcessor, BatchReport, PRIVATE_REASON};
pub use resolver::{
    CloudFallback, Resolution, ResolveTranscript, TranscriptResolver, NO_TRANSCRIPT_REASON,
};
pub use speech::{CloudTranscript, RecognitionEvent, SpeechTranslator};
pub use stats::StatCollector;
pub use tiktok::{AudioFetcher, CaptionSource, VideoFetcher};
