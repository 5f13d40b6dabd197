mod config;
mod logging;
mod notion_rs;
mod ports;
mod services;
mod yt_dlp;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use color_eyre::{Result, eyre::Context};

use crate::{
    config::{DEFAULT_MAX_RETRIES, FileConfig, SyncConfig},
    logging::setup_logging,
    services::{
        notion::client::NotionHttpAdapter, sync::PlaylistSyncService,
        youtube::client::YtDlpAdapter,
    },
};

/// Import the videos of a YouTube playlist into a Notion database, skipping
/// videos that are already there.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    notion_token: String,

    /// Id of the Notion database to add rows to
    #[arg(long, env = "DATABASE_ID")]
    database_id: String,

    /// Id (or URL) of the YouTube playlist to import
    #[arg(long, env = "PLAYLIST_ID")]
    playlist_id: String,

    /// Priority given to every imported video (default: Medium)
    #[arg(long, env = "PRIORITY")]
    priority: Option<String>,

    /// Comma separated topics given to every imported video
    #[arg(long, env = "TOPIC_LIST")]
    topic_list: Option<String>,

    /// How many times a rate limited Notion request is retried
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES, env = "NOTION_MAX_RETRIES")]
    max_retries: usize,

    /// Config file with the Notion property names
    #[arg(short, long, env = "PLAYLIST_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level (default: info)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug")]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "PLAYLIST_SYNC_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Playlist sync starting");
    log::debug!("Loading configuration");

    let file_config = {
        if let Some(config) = &args.config {
            FileConfig::from_file(config)
        } else {
            FileConfig::load()
        }
    }
    .wrap_err("Failed to load playlist-notion-sync config")?;

    let config = SyncConfig::new(
        args.notion_token,
        args.database_id,
        args.playlist_id,
        args.priority,
        args.topic_list,
        args.max_retries,
        file_config.properties,
    )
    .wrap_err("Invalid configuration")?;

    let store = NotionHttpAdapter::new(&config).wrap_err("Failed to create Notion client")?;
    let service = PlaylistSyncService::new(YtDlpAdapter::new(), store);

    let started = Instant::now();
    let today = chrono::Local::now().date_naive();
    let report = service.run(&config, today).await?;

    log::info!(
        "Done in {}. Added {} new videos to Notion ({} skipped, {} failed).",
        humantime::format_duration(Duration::from_secs(started.elapsed().as_secs())),
        report.added,
        report.skipped,
        report.failed
    );

    Ok(())
}
