use std::sync::{Arc, Mutex};

use transcript_pulse::{
    tiktok::{media::DownloadedAudio, metadata::VideoMetadata},
    AudioFetcher,
};

#[derive(Default)]
pub struct MockAudioFetcher {
    fail_with: Option<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockAudioFetcher {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl AudioFetcher for MockAudioFetcher {
    async fn fetch_audio(&self, metadata: &VideoMetadata) -> anyhow::Result<DownloadedAudio> {
        self.calls.lock().unwrap().push(metadata.url().to_string());
        if let Some(msg) = &self.fail_with {
            return Err(anyhow::anyhow!("{msg}"));
        }
        Ok(DownloadedAudio::untracked("/tmp/mock-audio.wav"))
    }
}
