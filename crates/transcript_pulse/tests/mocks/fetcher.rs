use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use serde_json::json;
use transcript_pulse::{tiktok::metadata::VideoMetadata, FetchError, VideoFetcher};

pub fn sample_metadata(url: &str) -> VideoMetadata {
    VideoMetadata::new(
        url,
        json!({
            "id": "7123456789012345678",
            "desc": "ein testvideo",
            "video": {
                "duration": 15,
                "downloadAddr": "https://v16.tiktokcdn.com/video.mp4"
            }
        }),
    )
}

#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, Result<VideoMetadata, FetchError>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn with_responses(responses: Vec<(&str, Result<VideoMetadata, FetchError>)>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(url, response)| (url.to_string(), response))
                .collect(),
            ..Default::default()
        }
    }
}

impl VideoFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<VideoMetadata, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::EmptyResponse))
    }
}
