use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context;

use crate::{datastore::VideoStore, TranscriptUpdate, Video};

const URL_COLUMN: &str = "url";
const EN_COLUMN: &str = "english_transcript";
const DE_COLUMN: &str = "german_transcript";
const REASON_COLUMN: &str = "error_reason";

/// CSV-backed store for runs without a database.
///
/// Reads the `url` column of an existing file and writes transcripts
/// and failure reasons to a `<stem>_transcribed_copy.csv` next to it,
/// leaving the input untouched. When the copy already exists it is
/// loaded instead, so re-runs resume from previous progress. Row ids
/// are the zero-based record index of the source file.
pub struct CsvVideoStore {
    copy_path: PathBuf,
    state: Mutex<CsvState>,
}

struct CsvState {
    headers: Vec<String>,
    url_idx: usize,
    en_idx: usize,
    de_idx: usize,
    reason_idx: usize,
    rows: Vec<Vec<String>>,
}

impl CsvVideoStore {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let copy_path = transcribed_copy_path(path);

        let source = if copy_path.exists() {
            tracing::info!(path = %copy_path.display(), "Resuming from existing transcribed copy");
            copy_path.as_path()
        } else {
            path
        };

        let mut reader = csv::Reader::from_path(source)
            .with_context(|| format!("Failed to open csv file {}", source.display()))?;

        let mut headers: Vec<String> = reader
            .headers()
            .context("Failed to read csv headers")?
            .iter()
            .map(str::to_owned)
            .collect();

        let url_idx = headers
            .iter()
            .position(|h| h == URL_COLUMN)
            .with_context(|| format!("csv file has no '{URL_COLUMN}' column"))?;

        let en_idx = ensure_column(&mut headers, EN_COLUMN);
        let de_idx = ensure_column(&mut headers, DE_COLUMN);
        let reason_idx = ensure_column(&mut headers, REASON_COLUMN);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("Failed to read csv record")?;
            let mut row: Vec<String> = record.iter().map(str::to_owned).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(CsvVideoStore {
            copy_path,
            state: Mutex::new(CsvState {
                headers,
                url_idx,
                en_idx,
                de_idx,
                reason_idx,
                rows,
            }),
        })
    }

    pub fn copy_path(&self) -> &Path {
        &self.copy_path
    }

    fn write_copy(&self, state: &CsvState) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_path(&self.copy_path)
            .with_context(|| format!("Failed to create {}", self.copy_path.display()))?;

        writer
            .write_record(&state.headers)
            .context("Failed to write csv headers")?;
        for row in &state.rows {
            writer.write_record(row).context("Failed to write csv row")?;
        }
        writer.flush().context("Failed to flush csv writer")?;

        Ok(())
    }
}

impl VideoStore for CsvVideoStore {
    async fn pending_videos(&self) -> anyhow::Result<Vec<Video>> {
        let state = self.state.lock().expect("csv store mutex poisoned");

        Ok(state
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                row[state.en_idx].is_empty()
                    && row[state.de_idx].is_empty()
                    && row[state.reason_idx].is_empty()
            })
            .map(|(index, row)| video_from_row(&state, index, row))
            .collect())
    }

    async fn videos_with_transcript(&self) -> anyhow::Result<Vec<Video>> {
        let state = self.state.lock().expect("csv store mutex poisoned");

        Ok(state
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row[state.en_idx].is_empty() || !row[state.de_idx].is_empty())
            .map(|(index, row)| video_from_row(&state, index, row))
            .collect())
    }

    async fn update_transcript(&self, update: &TranscriptUpdate) -> anyhow::Result<()> {
        let mut state = self.state.lock().expect("csv store mutex poisoned");
        let (en_idx, de_idx, reason_idx) = (state.en_idx, state.de_idx, state.reason_idx);

        let row = state
            .rows
            .get_mut(update.video_id as usize)
            .with_context(|| format!("csv row {} out of range", update.video_id))?;

        row[en_idx] = update.transcript_en.clone().unwrap_or_default();
        row[de_idx] = update.transcript_de.clone().unwrap_or_default();
        row[reason_idx] = update.failure_reason.clone().unwrap_or_default();

        // rewrite the whole copy on every update so an interrupted run
        // loses at most the row in flight
        self.write_copy(&state)
    }
}

fn video_from_row(state: &CsvState, index: usize, row: &[String]) -> Video {
    Video {
        id: index as i64,
        url: row[state.url_idx].clone(),
        transcript_en: non_empty(&row[state.en_idx]),
        transcript_de: non_empty(&row[state.de_idx]),
        has_transcript: Some(!row[state.en_idx].is_empty() || !row[state.de_idx].is_empty()),
        failure_reason: non_empty(&row[state.reason_idx]),
    }
}

fn non_empty(cell: &str) -> Option<String> {
    (!cell.is_empty()).then(|| cell.to_owned())
}

fn ensure_column(headers: &mut Vec<String>, name: &str) -> usize {
    headers.iter().position(|h| h == name).unwrap_or_else(|| {
        headers.push(name.to_owned());
        headers.len() - 1
    })
}

fn transcribed_copy_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_transcribed_copy.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Language, Transcripts};

    fn write_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("videos.csv");
        std::fs::write(
            &path,
            "hashtag,url\n\
             politik,https://www.tiktok.com/@a/video/1\n\
             politik,https://www.tiktok.com/@b/video/2\n\
             wahl,https://www.tiktok.com/@c/video/3\n",
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn all_rows_start_pending() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvVideoStore::load(write_fixture(dir.path())).unwrap();

        let pending = store.pending_videos().await.unwrap();
        assert_eq!(pending.len(), 3);
        assert_eq!(pending[0].id, 0);
        assert_eq!(pending[2].url, "https://www.tiktok.com/@c/video/3");
    }

    #[tokio::test]
    async fn updates_are_persisted_and_resumed_from_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());
        let store = CsvVideoStore::load(&path).unwrap();

        let mut transcripts = Transcripts::new();
        transcripts.append_fragment(Language::EngUs, "Hello world");
        store
            .update_transcript(&TranscriptUpdate::from_transcripts(0, &transcripts))
            .await
            .unwrap();
        store
            .update_transcript(&TranscriptUpdate::failed(1, "video is private"))
            .await
            .unwrap();

        // a fresh load picks up the copy, not the original
        let resumed = CsvVideoStore::load(&path).unwrap();
        let pending = resumed.pending_videos().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 2);

        let transcribed = resumed.videos_with_transcript().await.unwrap();
        assert_eq!(transcribed.len(), 1);
        assert_eq!(transcribed[0].transcript_en.as_deref(), Some("Hello world "));

        // the original input stays untouched
        let original = std::fs::read_to_string(&path).unwrap();
        assert!(!original.contains("Hello world"));
    }

    #[tokio::test]
    async fn missing_url_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "id,link\n1,https://example.com\n").unwrap();

        assert!(CsvVideoStore::load(&path).is_err());
    }
}
