use std::sync::{Arc, Mutex};

use transcript_pulse::{
    tiktok::media::DownloadedAudio, CloudTranscript, SpeechTranslator,
};
use video_datastore::{Language, Transcripts};

#[derive(Default)]
pub struct MockSpeechTranslator {
    transcripts: Transcripts,
    recognized_events: usize,
    fail_with: Option<String>,
    pub calls: Arc<Mutex<Vec<std::path::PathBuf>>>,
}

impl MockSpeechTranslator {
    /// Recognizes the given texts as one segment per language.
    pub fn recognizing(en: &str, de: &str) -> Self {
        let mut transcripts = Transcripts::new();
        transcripts.append_fragment(Language::EngUs, en);
        transcripts.append_fragment(Language::DeuDe, de);
        Self {
            transcripts,
            recognized_events: 1,
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl SpeechTranslator for MockSpeechTranslator {
    async fn translate(&self, audio: &DownloadedAudio) -> anyhow::Result<CloudTranscript> {
        self.calls.lock().unwrap().push(audio.wav_path().to_path_buf());
        if let Some(msg) = &self.fail_with {
            return Err(anyhow::anyhow!("{msg}"));
        }
        Ok(CloudTranscript {
            transcripts: self.transcripts.clone(),
            recognized_events: self.recognized_events,
            canceled: None,
        })
    }
}
