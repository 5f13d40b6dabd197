use std::collections::HashSet;

use chrono::NaiveDate;

use crate::config::SyncConfig;
use crate::notion_rs::error::NotionError;
use crate::ports::notion::{
    PLAY_ICON_URL, PRIVATE_ICON_EMOJI, RowIcon, RowPayload, RowStatus, RowStore,
};
use crate::ports::youtube::{PlaylistSource, VideoEntry};
use crate::yt_dlp::FetchError;

/// Errors that stop a sync before any rows are written.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to fetch playlist {playlist_id}")]
    Fetch {
        playlist_id: String,
        #[source]
        source: FetchError,
    },
    #[error("Notion rejected the access token")]
    Auth(#[source] NotionError),
    #[error("Notion database {database_id} not found or not shared with the integration")]
    NotFound {
        database_id: String,
        #[source]
        source: NotionError,
    },
    #[error("Failed to read existing rows from Notion database {database_id}")]
    Database {
        database_id: String,
        #[source]
        source: NotionError,
    },
}

impl SyncError {
    fn from_read(database_id: &str, source: NotionError) -> Self {
        match source {
            NotionError::Unauthorized(_) => SyncError::Auth(source),
            NotionError::NotFound(_) => SyncError::NotFound {
                database_id: database_id.to_string(),
                source,
            },
            source => SyncError::Database {
                database_id: database_id.to_string(),
                source,
            },
        }
    }
}

/// Result of a sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub playlist_title: String,
    pub fetched: usize,
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Builds the row for a video. Priority and topics come from config, not the video.
pub fn build_row(
    video: &VideoEntry,
    playlist_title: &str,
    config: &SyncConfig,
    today: NaiveDate,
) -> RowPayload {
    let (status, icon) = if video.private {
        (
            RowStatus::OnHold,
            RowIcon::Emoji(PRIVATE_ICON_EMOJI.to_string()),
        )
    } else {
        (
            RowStatus::ToWatch,
            RowIcon::External(PLAY_ICON_URL.to_string()),
        )
    };

    RowPayload {
        title: video.title.clone(),
        priority: config.priority.clone(),
        topics: config.topics.clone(),
        playlist_name: playlist_title.to_string(),
        status,
        url: video.url.clone(),
        date_added: today,
        upload_date: video.upload_date,
        length_secs: video.duration_secs,
        icon,
    }
}

pub struct PlaylistSyncService<P: PlaylistSource, S: RowStore> {
    source: P,
    store: S,
}

impl<P: PlaylistSource, S: RowStore> PlaylistSyncService<P, S> {
    pub fn new(source: P, store: S) -> Self {
        Self { source, store }
    }

    /// One-way sync of the configured playlist into the configured database.
    ///
    /// This function:
    /// - Lists the playlist and reads existing urls concurrently
    /// - Skips videos whose url is already stored, or was written earlier in this run
    /// - Creates one row per remaining video, in playlist order
    ///
    /// # Errors
    /// Returns an error if the playlist can't be fetched or the database can't be read.
    /// A failed row write is logged and counted in the report; the loop moves on.
    pub async fn run(
        &self,
        config: &SyncConfig,
        today: NaiveDate,
    ) -> Result<SyncReport, SyncError> {
        log::info!(
            "Starting sync of playlist {} into database {}",
            config.playlist_id,
            config.database_id
        );

        let (playlist, existing_urls) = tokio::try_join!(
            async {
                self.source
                    .list_playlist_videos(&config.playlist_id)
                    .await
                    .map_err(|source| SyncError::Fetch {
                        playlist_id: config.playlist_id.clone(),
                        source,
                    })
            },
            async {
                self.store
                    .query_existing_urls(&config.database_id)
                    .await
                    .map_err(|e| SyncError::from_read(&config.database_id, e))
            },
        )?;

        let total = playlist.entries.len();
        log::debug!(
            "Playlist {} has {} entries, database has {} urls",
            playlist.id,
            total,
            existing_urls.len()
        );
        let mut report = SyncReport {
            playlist_title: playlist.title.clone(),
            fetched: total,
            ..SyncReport::default()
        };
        let mut written: HashSet<&str> = HashSet::new();

        for (index, video) in playlist.entries.iter().enumerate() {
            let position = index + 1;
            if existing_urls.contains(&video.url) || written.contains(video.url.as_str()) {
                report.skipped += 1;
                log::info!(
                    "[{}/{}] Skipped duplicate: {} ({})",
                    position,
                    total,
                    video.title,
                    video.url
                );
                continue;
            }

            let row = build_row(video, &playlist.title, config, today);
            match self.store.create_row(&config.database_id, &row).await {
                Ok(row_id) => {
                    written.insert(video.url.as_str());
                    report.added += 1;
                    log::info!(
                        "[{}/{}] Added {} ({})",
                        position,
                        total,
                        video.title,
                        video.url
                    );
                    log::debug!("Video {} stored as page {}", video.id, row_id);
                }
                Err(e) => {
                    report.failed += 1;
                    log::error!(
                        "[{}/{}] Failed to add {} ({}): {}",
                        position,
                        total,
                        video.title,
                        video.url,
                        e
                    );
                }
            }
        }

        log::info!(
            "Sync complete for playlist '{}': {} fetched, {} added, {} skipped, {} failed",
            report.playlist_title,
            report.fetched,
            report.added,
            report.skipped,
            report.failed
        );

        Ok(report)
    }
}
