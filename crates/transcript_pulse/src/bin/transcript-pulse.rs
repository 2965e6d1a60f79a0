use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use video_datastore::{CsvVideoStore, PgVideoStore, VideoStore};

use transcript_pulse::{
    speech::{AzureSpeechClient, AzureSpeechConfig},
    tiktok::{
        captions::CaptionExtractor,
        fetcher::{self, TikTokClient},
        media::MediaDownloader,
    },
    tracing::init_tracing_subscriber,
    BatchProcessorBuilder, BatchReport, CloudFallback, ResolveTranscript, TranscriptResolver,
};

#[derive(Parser)]
#[command(name = "transcript-pulse", about = "TikTok transcript acquisition pipeline")]
struct Cli {
    /// Azure speech resource key; without it the cloud fallback is off
    #[arg(long, env = "AZURE_SPEECH_KEY")]
    azure_speech_key: Option<String>,

    /// Azure translator resource key
    #[arg(long, env = "AZURE_TRANSLATOR_KEY")]
    azure_translator_key: Option<String>,

    /// Azure region hosting both resources
    #[arg(long, env = "AZURE_REGION", default_value = "westeurope")]
    azure_region: String,

    /// Browser session cookie sent with every TikTok request
    #[arg(long, env = "TIKTOK_SESSION_COOKIE")]
    session_cookie: Option<String>,

    /// Skip the cloud fallback even when credentials are present
    #[arg(long)]
    disable_fallback: bool,

    /// Suppress the terminal progress bar
    #[arg(long)]
    no_progress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process pending videos from the Postgres datastore
    Db {
        /// Database connection URL
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Process videos listed in a CSV export
    Csv {
        /// Path to the CSV file with a `url` column
        path: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    init_tracing_subscriber()?;

    let cli = Cli::parse();

    let client = fetcher::http_client()?;
    let fetcher = TikTokClient::new(client.clone(), cli.session_cookie.clone());
    let captions = CaptionExtractor::new(client.clone());

    let fallback = if cli.disable_fallback {
        tracing::info!("Cloud fallback disabled by flag");
        None
    } else {
        match (&cli.azure_speech_key, &cli.azure_translator_key) {
            (Some(speech_key), Some(translator_key)) => Some(CloudFallback {
                audio: MediaDownloader::new(client),
                speech: AzureSpeechClient::new(
                    reqwest::Client::new(),
                    AzureSpeechConfig {
                        speech_key: speech_key.clone(),
                        translator_key: translator_key.clone(),
                        region: cli.azure_region.clone(),
                    },
                ),
            }),
            _ => {
                tracing::warn!(
                    "Azure credentials not fully configured; videos without captions will fail"
                );
                None
            }
        }
    };

    let resolver = TranscriptResolver::new(fetcher, captions, fallback);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received; finishing the current video");
                cancel.cancel();
            }
        }
    });

    let report = match &cli.command {
        Command::Db { database_url } => {
            let store = PgVideoStore::init(database_url).await?;
            run(store, resolver, cancel, !cli.no_progress).await?
        }
        Command::Csv { path } => {
            let store = CsvVideoStore::load(path)?;
            run(store, resolver, cancel, !cli.no_progress).await?
        }
    };

    println!("{}", report.stats.render());

    Ok(())
}

async fn run<D, R>(
    datastore: D,
    resolver: R,
    cancel: CancellationToken,
    show_progress: bool,
) -> anyhow::Result<BatchReport>
where
    D: VideoStore + Send + Sync,
    R: ResolveTranscript + Send + Sync,
{
    BatchProcessorBuilder::new()
        .datastore(datastore)
        .resolver(resolver)
        .show_progress(show_progress)
        .build()
        .run(cancel)
        .await
}
