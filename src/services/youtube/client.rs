use crate::ports::youtube::{Playlist, PlaylistSource, VideoEntry};
use crate::yt_dlp::types::FlatEntry;
use crate::yt_dlp::{self, FetchError};

/// Reads playlists by shelling out to `yt-dlp`.
#[derive(Debug, Default)]
pub struct YtDlpAdapter;

impl YtDlpAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Maps a flat playlist entry to a video. Entries without an id have no url to dedup on
/// and are dropped.
pub fn video_from_flat(entry: Option<FlatEntry>, playlist_title: &str) -> Option<VideoEntry> {
    let entry = entry?;
    let id = entry.id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
    let private = entry.is_private();

    let title = if private {
        format!("Private Video -> {}", playlist_title)
    } else {
        entry.title.as_deref().unwrap_or_default().trim().to_string()
    };

    Some(VideoEntry {
        id: id.to_string(),
        url: yt_dlp::video_url(id),
        title,
        duration_secs: if private { None } else { entry.duration_secs() },
        upload_date: None,
        private,
    })
}

#[async_trait::async_trait]
impl PlaylistSource for YtDlpAdapter {
    async fn list_playlist_videos(&self, playlist_id: &str) -> Result<Playlist, FetchError> {
        let flat = yt_dlp::fetch_flat_playlist(playlist_id).await?;
        let title = flat.display_title();
        let total = flat.entries.len();
        log::info!("Listing {} entries of playlist '{}'", total, title);
        if let Some(id) = &flat.id {
            log::debug!("yt-dlp resolved playlist id {}", id);
        }

        let mut entries = Vec::with_capacity(total);
        for (index, raw) in flat.entries.into_iter().enumerate() {
            let Some(mut video) = video_from_flat(raw, &title) else {
                log::warn!(
                    "Skipping playlist entry {}/{}: no video id",
                    index + 1,
                    total
                );
                continue;
            };

            if !video.private {
                match yt_dlp::fetch_video_metadata(&video.url).await {
                    Ok(metadata) => {
                        video.upload_date = metadata.upload_date();
                        video.duration_secs = metadata.duration_secs().or(video.duration_secs);
                    }
                    Err(e) => log::warn!(
                        "Failed to fetch metadata for '{}' ({}): {}",
                        video.title,
                        video.url,
                        e
                    ),
                }
            }

            log::info!(
                "Fetched {}/{}: {} ({})",
                index + 1,
                total,
                video.title,
                video.url
            );
            entries.push(video);
        }

        log::info!("Found {} videos in playlist '{}'", entries.len(), title);
        Ok(Playlist {
            id: playlist_id.to_string(),
            title,
            entries,
        })
    }
}
