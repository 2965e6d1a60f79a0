use std::collections::BTreeMap;
use std::fmt;

/// The two language tags the pipeline recognizes. Caption tracks and
/// cloud translations in any other language are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    EngUs,
    DeuDe,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::EngUs, Language::DeuDe];

    /// The tag used by TikTok caption track descriptors.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::EngUs => "eng-US",
            Language::DeuDe => "deu-DE",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "eng-US" => Some(Language::EngUs),
            "deu-DE" => Some(Language::DeuDe),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Where a resolved transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptSource {
    /// Embedded caption tracks served by TikTok itself.
    Platform,
    /// Azure speech-translation fallback.
    CloudSpeech,
}

impl fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptSource::Platform => f.write_str("TikTok"),
            TranscriptSource::CloudSpeech => f.write_str("Azure Speech to Text"),
        }
    }
}

/// Per-language transcript text, accumulated fragment by fragment.
///
/// Each appended fragment is followed by a single space; some caption
/// cues run into each other without one, so the separator is always
/// added and never deduplicated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcripts(BTreeMap<Language, String>);

impl Transcripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_fragment(&mut self, language: Language, fragment: &str) {
        let text = self.0.entry(language).or_default();
        text.push_str(fragment);
        text.push(' ');
    }

    pub fn insert(&mut self, language: Language, text: String) {
        self.0.insert(language, text);
    }

    pub fn get(&self, language: Language) -> Option<&str> {
        self.0.get(&language).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|text| text.trim().is_empty())
    }
}

/// One persisted video row, as selected from the store.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub url: String,
    pub transcript_en: Option<String>,
    pub transcript_de: Option<String>,
    pub has_transcript: Option<bool>,
    pub failure_reason: Option<String>,
}

/// The single typed row mapping applied at the sink boundary.
///
/// Empty or whitespace-only transcript text is normalized to NULL and
/// `has_transcript` is derived from what remains, so every backend
/// writes the same shape regardless of how the resolution looked.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptUpdate {
    pub video_id: i64,
    pub transcript_en: Option<String>,
    pub transcript_de: Option<String>,
    pub has_transcript: bool,
    pub failure_reason: Option<String>,
}

impl TranscriptUpdate {
    pub fn from_transcripts(video_id: i64, transcripts: &Transcripts) -> Self {
        let transcript_en = normalize(transcripts.get(Language::EngUs));
        let transcript_de = normalize(transcripts.get(Language::DeuDe));
        let has_transcript = transcript_en.is_some() || transcript_de.is_some();

        TranscriptUpdate {
            video_id,
            transcript_en,
            transcript_de,
            has_transcript,
            failure_reason: None,
        }
    }

    pub fn failed(video_id: i64, reason: impl Into<String>) -> Self {
        TranscriptUpdate {
            video_id,
            transcript_en: None,
            transcript_de: None,
            has_transcript: false,
            failure_reason: normalize(Some(&reason.into())),
        }
    }
}

fn normalize(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty()).map(str::to_owned)
}
