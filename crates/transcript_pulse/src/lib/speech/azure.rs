//! Azure-backed recognition sessions. One session makes two REST
//! calls: the fast transcription endpoint turns the audio into spoken
//! phrases, and the translator endpoint renders every phrase in both
//! target languages. Phrases are then replayed as recognition events.

use serde::Deserialize;
use tokio::sync::mpsc;
use video_datastore::Language;

use crate::{
    speech::{
        drain_events, CloudTranscript, RecognitionEvent, SpeechTranslator,
        EVENT_CHANNEL_CAPACITY,
    },
    tiktok::media::DownloadedAudio,
};

const TRANSCRIBE_API_VERSION: &str = "2024-11-15";
const TRANSLATE_API_VERSION: &str = "3.0";
const TRANSLATOR_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com/translate";

#[derive(Debug, thiserror::Error)]
pub enum AzureSpeechError {
    #[error("http request to the speech service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("speech service returned status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("could not read audio file: {0}")]
    Audio(#[from] std::io::Error),
    #[error("recognition session was canceled before producing any segment: {0}")]
    Session(String),
}

/// Credentials for the speech and translator resources. Both live in
/// the same Azure region.
#[derive(Debug, Clone)]
pub struct AzureSpeechConfig {
    pub speech_key: String,
    pub translator_key: String,
    pub region: String,
}

impl AzureSpeechConfig {
    fn transcribe_url(&self) -> String {
        format!(
            "https://{}.api.cognitive.microsoft.com/speechtotext/transcriptions:transcribe?api-version={}",
            self.region, TRANSCRIBE_API_VERSION
        )
    }
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    phrases: Vec<Phrase>,
}

#[derive(Debug, Deserialize)]
struct Phrase {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TranslationResult {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
    to: String,
}

pub struct AzureSpeechClient {
    http: reqwest::Client,
    config: AzureSpeechConfig,
}

impl AzureSpeechClient {
    pub fn new(http: reqwest::Client, config: AzureSpeechConfig) -> Self {
        AzureSpeechClient { http, config }
    }

    async fn transcribe(&self, wav_bytes: Vec<u8>) -> Result<Vec<Phrase>, AzureSpeechError> {
        let definition = serde_json::json!({ "locales": ["en-US", "de-DE"] });
        let form = reqwest::multipart::Form::new()
            .part(
                "audio",
                reqwest::multipart::Part::bytes(wav_bytes)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")?,
            )
            .text("definition", definition.to_string());

        let response = self
            .http
            .post(self.config.transcribe_url())
            .header("Ocp-Apim-Subscription-Key", &self.config.speech_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AzureSpeechError::Api { status, body });
        }

        let parsed: TranscribeResponse = response.json().await?;
        Ok(parsed.phrases)
    }

    /// Translates all phrase texts in one call; the service returns
    /// one result per input text, in input order.
    async fn translate_phrases(
        &self,
        phrases: &[Phrase],
    ) -> Result<Vec<TranslationResult>, AzureSpeechError> {
        let body: Vec<_> = phrases
            .iter()
            .map(|p| serde_json::json!({ "Text": p.text }))
            .collect();

        let response = self
            .http
            .post(TRANSLATOR_ENDPOINT)
            .query(&[
                ("api-version", TRANSLATE_API_VERSION),
                ("to", "en"),
                ("to", "de"),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.config.translator_key)
            .header("Ocp-Apim-Subscription-Region", &self.config.region)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AzureSpeechError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    async fn run_session(
        &self,
        wav_bytes: Vec<u8>,
        events: mpsc::Sender<RecognitionEvent>,
    ) {
        let outcome = async {
            let phrases = self.transcribe(wav_bytes).await?;
            if phrases.is_empty() {
                return Ok(Vec::new());
            }
            let translated = self.translate_phrases(&phrases).await?;
            Ok::<_, AzureSpeechError>(translated)
        }
        .await;

        match outcome {
            Ok(results) => {
                for result in results {
                    let translations = result
                        .translations
                        .into_iter()
                        .filter_map(|t| Some((language_for(&t.to)?, t.text)))
                        .collect();
                    if events
                        .send(RecognitionEvent::Recognized { translations })
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
                let _ = events.send(RecognitionEvent::Stopped).await;
            }
            Err(error) => {
                let _ = events
                    .send(RecognitionEvent::Canceled {
                        reason: error.to_string(),
                    })
                    .await;
            }
        }
    }
}

fn language_for(tag: &str) -> Option<Language> {
    match tag {
        "en" => Some(Language::EngUs),
        "de" => Some(Language::DeuDe),
        _ => None,
    }
}

impl SpeechTranslator for AzureSpeechClient {
    #[tracing::instrument(skip_all, fields(wav = %audio.wav_path().display()))]
    async fn translate(&self, audio: &DownloadedAudio) -> anyhow::Result<CloudTranscript> {
        let wav_bytes = tokio::fs::read(audio.wav_path())
            .await
            .map_err(AzureSpeechError::Audio)?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (result, _) = tokio::join!(drain_events(rx), self.run_session(wav_bytes, tx));

        tracing::debug!(
            recognized_events = result.recognized_events,
            canceled = result.canceled.as_deref().unwrap_or(""),
            "Recognition session drained"
        );

        if result.recognized_events == 0 {
            if let Some(reason) = result.canceled {
                return Err(AzureSpeechError::Session(reason).into());
            }
        }

        Ok(result)
    }
}
