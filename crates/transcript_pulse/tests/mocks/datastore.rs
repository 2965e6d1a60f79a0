use std::sync::{Arc, Mutex};

use video_datastore::{TranscriptUpdate, Video, VideoStore};

pub fn video(id: i64, url: &str) -> Video {
    Video {
        id,
        url: url.to_string(),
        transcript_en: None,
        transcript_de: None,
        has_transcript: None,
        failure_reason: None,
    }
}

#[derive(Clone, Default)]
pub struct MockVideoStore {
    videos: Vec<Video>,
    pub updates: Arc<Mutex<Vec<TranscriptUpdate>>>,
    fail_update_for: Option<i64>,
}

impl MockVideoStore {
    pub fn with_videos(videos: Vec<Video>) -> Self {
        Self {
            videos,
            ..Default::default()
        }
    }

    pub fn failing_update_for(mut self, video_id: i64) -> Self {
        self.fail_update_for = Some(video_id);
        self
    }
}

impl VideoStore for MockVideoStore {
    async fn pending_videos(&self) -> anyhow::Result<Vec<Video>> {
        let updates = self.updates.lock().unwrap();
        Ok(self
            .videos
            .iter()
            .filter(|v| !updates.iter().any(|u| u.video_id == v.id))
            .cloned()
            .collect())
    }

    async fn videos_with_transcript(&self) -> anyhow::Result<Vec<Video>> {
        let updates = self.updates.lock().unwrap();
        Ok(self
            .videos
            .iter()
            .filter_map(|v| {
                let update = updates
                    .iter()
                    .find(|u| u.video_id == v.id && u.has_transcript)?;
                let mut row = v.clone();
                row.transcript_en = update.transcript_en.clone();
                row.transcript_de = update.transcript_de.clone();
                row.has_transcript = Some(true);
                Some(row)
            })
            .collect())
    }

    async fn update_transcript(&self, update: &TranscriptUpdate) -> anyhow::Result<()> {
        if self.fail_update_for == Some(update.video_id) {
            return Err(anyhow::anyhow!("simulated sink failure"));
        }
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }
}
