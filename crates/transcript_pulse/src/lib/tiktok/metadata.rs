//! Typed view over the metadata payload TikTok embeds in a video
//! page's rehydration script tag.

use std::{ops::Deref, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

static UNIVERSAL_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__"[^>]*>\s*(\{.*?\})\s*</script>"#,
    )
    .expect("valid regex")
});

/// Raw HTML of one TikTok video page.
pub struct TikTokPage(String);

impl TikTokPage {
    pub fn new(html: String) -> Self {
        TikTokPage(html)
    }

    /// Extracts the `__UNIVERSAL_DATA_FOR_REHYDRATION__` JSON blob.
    /// `None` covers both a missing script tag and unparseable JSON,
    /// which together form the "empty response" fetch category.
    pub fn universal_data(&self) -> Option<Value> {
        UNIVERSAL_DATA_RE
            .captures(self)
            .and_then(|cap| cap.get(1))
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
    }
}

impl Deref for TikTokPage {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<String> for TikTokPage {
    fn from(value: String) -> Self {
        TikTokPage(value)
    }
}

/// The one place that decides whether a payload describes a reachable
/// video. A missing key path is read as "private or removed", which
/// conflates a few upstream failure shapes (actual private videos,
/// removed videos, markup drift); keeping the check here makes that
/// call easy to revisit.
pub fn item_struct(universal_data: &Value) -> Option<Value> {
    let details =
        &universal_data["__DEFAULT_SCOPE__"]["webapp.video-detail"]["itemInfo"]["itemStruct"];
    details.is_object().then(|| details.clone())
}

/// One embedded caption track descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtitleInfo {
    #[serde(rename = "LanguageCodeName", default)]
    pub language_code_name: String,
    #[serde(rename = "Format", default)]
    pub format: String,
    #[serde(rename = "Url", default)]
    pub url: String,
}

/// Fetched metadata for one video, held transiently while the
/// resolver works on it.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    url: String,
    details: Value,
}

impl VideoMetadata {
    pub fn new(url: impl Into<String>, details: Value) -> Self {
        VideoMetadata {
            url: url.into(),
            details,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn id(&self) -> Option<i64> {
        self.details["id"].as_str().and_then(|id| id.parse().ok())
    }

    pub fn description(&self) -> Option<&str> {
        self.details["desc"].as_str()
    }

    /// Duration in seconds. TikTok omits it occasionally; 20 seconds
    /// is a workable default for such clips.
    pub fn duration_secs(&self) -> u64 {
        self.details["video"]["duration"].as_u64().unwrap_or(20)
    }

    pub fn download_url(&self) -> Option<&str> {
        self.details["video"]["downloadAddr"].as_str()
    }

    pub fn is_ad(&self) -> bool {
        self.details["isAd"].as_bool().unwrap_or(false)
    }

    pub fn suggested_words(&self) -> Vec<String> {
        self.details["suggestedWords"]
            .as_array()
            .map(|words| {
                words
                    .iter()
                    .filter_map(|w| w.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the clip uses its own sound. The `original` flag is
    /// sometimes a string, sometimes absent; when absent, matching
    /// music author against video author is the usual tell.
    pub fn has_original_sound(&self) -> bool {
        match &self.details["music"]["original"] {
            Value::Bool(original) => *original,
            Value::String(original) => original.eq_ignore_ascii_case("true"),
            _ => {
                let music_author = self.details["music"]["authorName"].as_str();
                let video_author = self.details["author"]["nickname"].as_str();
                music_author.is_some() && music_author == video_author
            }
        }
    }

    pub fn subtitle_infos(&self) -> Vec<SubtitleInfo> {
        self.details["video"]["subtitleInfos"]
            .as_array()
            .map(|infos| {
                infos
                    .iter()
                    .filter_map(|info| serde_json::from_value(info.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_with(payload: &Value) -> TikTokPage {
        TikTokPage::new(format!(
            r#"<html><head><script id="__UNIVERSAL_DATA_FOR_REHYDRATION__" type="application/json">{payload}</script></head><body></body></html>"#
        ))
    }

    fn sample_details() -> Value {
        json!({
            "id": "7123456789012345678",
            "desc": "ein kurzes video #politik",
            "isAd": false,
            "suggestedWords": ["politik", "wahl"],
            "author": { "nickname": "somecreator" },
            "music": { "authorName": "somecreator" },
            "video": {
                "duration": 34,
                "downloadAddr": "https://v16.tiktokcdn.com/video.mp4",
                "subtitleInfos": [
                    { "LanguageCodeName": "deu-DE", "Format": "webvtt", "Url": "https://example.com/de.vtt" },
                    { "LanguageCodeName": "fra-FR", "Format": "webvtt", "Url": "https://example.com/fr.vtt" },
                    { "LanguageCodeName": "eng-US", "Format": "creator_caption", "Url": "https://example.com/cc.json" }
                ]
            }
        })
    }

    fn wrapped(details: Value) -> Value {
        json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": { "itemInfo": { "itemStruct": details } }
            }
        })
    }

    #[test]
    fn extracts_universal_data_from_page() {
        let page = page_with(&wrapped(sample_details()));
        let data = page.universal_data().expect("script tag should parse");
        assert!(item_struct(&data).is_some());
    }

    #[test]
    fn page_without_script_tag_yields_none() {
        let page = TikTokPage::new("<html><body>nothing here</body></html>".to_string());
        assert!(page.universal_data().is_none());
    }

    #[test]
    fn page_with_invalid_json_yields_none() {
        let page = TikTokPage::new(
            r#"<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__">{not: json}</script>"#.to_string(),
        );
        assert!(page.universal_data().is_none());
    }

    #[test]
    fn missing_key_path_classified_as_unavailable() {
        let data = json!({ "__DEFAULT_SCOPE__": { "webapp.login": {} } });
        assert!(item_struct(&data).is_none());
    }

    #[test]
    fn typed_accessors_read_the_payload() {
        let metadata = VideoMetadata::new("https://www.tiktok.com/@x/video/7", sample_details());

        assert_eq!(metadata.id(), Some(7123456789012345678));
        assert_eq!(metadata.description(), Some("ein kurzes video #politik"));
        assert_eq!(metadata.duration_secs(), 34);
        assert_eq!(
            metadata.download_url(),
            Some("https://v16.tiktokcdn.com/video.mp4")
        );
        assert!(!metadata.is_ad());
        assert_eq!(metadata.suggested_words(), vec!["politik", "wahl"]);
        assert!(metadata.has_original_sound());
        assert_eq!(metadata.subtitle_infos().len(), 3);
    }

    #[test]
    fn duration_defaults_when_absent() {
        let metadata = VideoMetadata::new("https://example.com", json!({ "video": {} }));
        assert_eq!(metadata.duration_secs(), 20);
    }

    #[test]
    fn original_sound_flag_accepts_string_form() {
        let metadata = VideoMetadata::new(
            "https://example.com",
            json!({ "music": { "original": "True" } }),
        );
        assert!(metadata.has_original_sound());
    }
}
