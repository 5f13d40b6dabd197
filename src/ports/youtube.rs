use chrono::NaiveDate;

use crate::yt_dlp::FetchError;

/// Decoupled representation of a video in a YouTube playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    pub duration_secs: Option<u32>,
    pub upload_date: Option<NaiveDate>,
    pub private: bool,
}

/// A playlist and its entries in playlist order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub entries: Vec<VideoEntry>,
}

/// Port trait wrapping the video platform capabilities used by the sync.
///
/// Implementations live in `services::youtube::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn list_playlist_videos(&self, playlist_id: &str) -> Result<Playlist, FetchError>;
}
