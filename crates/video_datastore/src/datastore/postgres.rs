use anyhow::Context;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};

use crate::{datastore::VideoStore, TranscriptUpdate, Video};

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Clone)]
pub struct PgVideoStore {
    pub pool: PgPool,
}

impl PgVideoStore {
    /// Establish connection to the database and run pending migrations
    pub async fn init(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .inspect_err(
                |e| tracing::error!(error = ?e, "Failed to establish connection to database"),
            )
            .context("Failed to connect to postgres database")?;

        MIGRATOR
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to run database migrations"))
            .context("Failed to run database migrations")?;

        Ok(PgVideoStore { pool })
    }
}

impl VideoStore for PgVideoStore {
    async fn pending_videos(&self) -> anyhow::Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, url, transcript_en, transcript_de, has_transcript, failure_reason
            FROM videos
            WHERE transcript_en IS NULL
              AND transcript_de IS NULL
              AND failure_reason IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .inspect_err(|e| tracing::error!(error = ?e, "Failed to fetch pending videos"))
        .context("Failed to fetch pending videos")?;

        tracing::debug!(count = videos.len(), "Fetched videos without transcription");
        Ok(videos)
    }

    async fn videos_with_transcript(&self) -> anyhow::Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, url, transcript_en, transcript_de, has_transcript, failure_reason
            FROM videos
            WHERE transcript_en IS NOT NULL OR transcript_de IS NOT NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch transcribed videos")?;

        Ok(videos)
    }

    async fn update_transcript(&self, update: &TranscriptUpdate) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE videos
            SET transcript_en = $1,
                transcript_de = $2,
                has_transcript = $3,
                failure_reason = $4
            WHERE id = $5
            "#,
        )
        .bind(&update.transcript_en)
        .bind(&update.transcript_de)
        .bind(update.has_transcript)
        .bind(&update.failure_reason)
        .bind(update.video_id)
        .execute(&self.pool)
        .await
        .inspect_err(|err| {
            tracing::error!(
                error = ?err,
                video_id = update.video_id,
                "Failed to update transcript"
            )
        })
        .context("Failed to update transcript")?;

        Ok(())
    }
}
