use anyhow::Context;
use video_datastore::{Language, Transcripts};

use crate::tiktok::{metadata::VideoMetadata, CaptionSource};

const EXPECTED_FORMAT: &str = "webvtt";

#[derive(Debug, thiserror::Error)]
#[error("malformed webvtt file: {0}")]
pub struct MalformedCaptionError(&'static str);

/// Downloads and parses the caption tracks embedded in a video's
/// metadata. One request per track, no retries: a track that fails to
/// download simply means that language is unavailable.
pub struct CaptionExtractor {
    client: reqwest::Client,
}

impl CaptionExtractor {
    pub fn new(client: reqwest::Client) -> Self {
        CaptionExtractor { client }
    }

    async fn download(&self, url: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("caption track request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("caption track returned status {}", response.status());
        }

        response
            .text()
            .await
            .context("failed to read caption track body")
    }
}

impl CaptionSource for CaptionExtractor {
    #[tracing::instrument(skip_all, fields(video_url = metadata.url()))]
    async fn extract(&self, metadata: &VideoMetadata) -> Transcripts {
        let mut transcripts = Transcripts::new();

        for info in metadata.subtitle_infos() {
            let Some(language) = Language::from_tag(&info.language_code_name) else {
                continue;
            };
            if info.format != EXPECTED_FORMAT {
                continue;
            }

            let body = match self.download(&info.url).await {
                Ok(body) => body,
                Err(error) => {
                    tracing::debug!(
                        %language,
                        error = ?error,
                        "Caption track download failed; treating language as unavailable"
                    );
                    continue;
                }
            };

            match parse_webvtt(&body) {
                Ok(cues) => {
                    for cue in cues {
                        transcripts.append_fragment(language, &cue);
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        video_url = metadata.url(),
                        %language,
                        %error,
                        "Skipping malformed caption track"
                    );
                }
            }
        }

        transcripts
    }
}

/// Parses a WebVTT document into its cue text fragments, in order.
/// Cue identifiers, timing lines, and NOTE/STYLE blocks are dropped;
/// multi-line cue text is joined with single spaces.
pub fn parse_webvtt(input: &str) -> Result<Vec<String>, MalformedCaptionError> {
    let mut lines = input.trim_start_matches('\u{feff}').lines();

    let header = lines
        .next()
        .ok_or(MalformedCaptionError("empty file"))?
        .trim();
    if !header.starts_with("WEBVTT") {
        return Err(MalformedCaptionError("missing WEBVTT header"));
    }

    let mut cues = Vec::new();
    let mut in_cue = false;
    let mut cue_text = String::new();

    for line in lines {
        let line = line.trim();

        if line.is_empty() {
            if in_cue && !cue_text.is_empty() {
                cues.push(std::mem::take(&mut cue_text));
            }
            in_cue = false;
            continue;
        }

        if line.contains("-->") {
            in_cue = true;
            cue_text.clear();
            continue;
        }

        if in_cue {
            if !cue_text.is_empty() {
                cue_text.push(' ');
            }
            cue_text.push_str(line);
        }
    }

    if in_cue && !cue_text.is_empty() {
        cues.push(cue_text);
    }

    Ok(cues)
}
