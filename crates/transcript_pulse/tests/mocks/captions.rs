use std::sync::{Arc, Mutex};

use transcript_pulse::{tiktok::metadata::VideoMetadata, CaptionSource};
use video_datastore::{Language, Transcripts};

#[derive(Default)]
pub struct MockCaptions {
    transcripts: Transcripts,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockCaptions {
    /// Returns the given English text for every video.
    pub fn with_english(text: &str) -> Self {
        let mut transcripts = Transcripts::new();
        transcripts.append_fragment(Language::EngUs, text);
        Self {
            transcripts,
            ..Default::default()
        }
    }

    /// Never finds captions.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl CaptionSource for MockCaptions {
    async fn extract(&self, metadata: &VideoMetadata) -> Transcripts {
        self.calls.lock().unwrap().push(metadata.url().to_string());
        self.transcripts.clone()
    }
}
