use std::process::Stdio;

use serde::de::DeserializeOwned;
use tokio::process::Command;
use url::Url;

pub mod types;

use types::{FlatPlaylist, VideoMetadata};

const YT_DLP: &str = "yt-dlp";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("yt-dlp not found in PATH. Please install yt-dlp and ensure it's available.")]
    ToolNotFound,
    #[error("Invalid playlist id: {0}")]
    InvalidPlaylistId(String),
    #[error("Failed to start yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("yt-dlp exited with status {status:?}:\n{stderr}")]
    Failed { status: Option<i32>, stderr: String },
    #[error("yt-dlp returned no output")]
    EmptyOutput,
    #[error("yt-dlp returned invalid JSON: {source}. First 200 chars:\n{preview}")]
    InvalidJson {
        preview: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Expected a playlist but yt-dlp returned a '{0}'")]
    NotAPlaylist(String),
}

/// Builds the playlist page URL for an id. Full URLs are passed through unchanged.
pub fn playlist_url(playlist_id: &str) -> Result<Url, FetchError> {
    let playlist_id = playlist_id.trim();
    if playlist_id.starts_with("https://") || playlist_id.starts_with("http://") {
        return Url::parse(playlist_id)
            .map_err(|_| FetchError::InvalidPlaylistId(playlist_id.to_string()));
    }

    let valid = !playlist_id.is_empty()
        && playlist_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(FetchError::InvalidPlaylistId(playlist_id.to_string()));
    }

    Url::parse_with_params("https://www.youtube.com/playlist", &[("list", playlist_id)])
        .map_err(|_| FetchError::InvalidPlaylistId(playlist_id.to_string()))
}

/// Canonical watch URL for a video id. This is the dedup key stored in Notion.
pub fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Runs yt-dlp with the given args and decodes its JSON output.
async fn run_yt_dlp<T: DeserializeOwned>(args: &[&str]) -> Result<T, FetchError> {
    if which::which(YT_DLP).is_err() {
        return Err(FetchError::ToolNotFound);
    }

    log::debug!("Running {} {}", YT_DLP, args.join(" "));
    let output = Command::new(YT_DLP)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        return Err(FetchError::Failed {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_output(&stdout)
}

fn parse_output<T: DeserializeOwned>(stdout: &str) -> Result<T, FetchError> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Err(FetchError::EmptyOutput);
    }

    serde_json::from_str(stdout).map_err(|source| FetchError::InvalidJson {
        preview: stdout.chars().take(200).collect(),
        source,
    })
}

/// Lists playlist entries without resolving each video (`--flat-playlist`).
pub async fn fetch_flat_playlist(playlist_id: &str) -> Result<FlatPlaylist, FetchError> {
    let url = playlist_url(playlist_id)?;
    let playlist: FlatPlaylist = run_yt_dlp(&["-J", "--flat-playlist", url.as_str()]).await?;
    playlist.ensure_playlist()?;
    Ok(playlist)
}

/// Resolves a single video for its upload date and duration.
pub async fn fetch_video_metadata(video_url: &str) -> Result<VideoMetadata, FetchError> {
    run_yt_dlp(&["-J", "--skip-download", "--no-check-formats", video_url]).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_url_from_id() {
        let url = playlist_url("PLabc123_-XYZ").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.youtube.com/playlist?list=PLabc123_-XYZ"
        );
    }

    #[test]
    fn test_playlist_url_passes_full_url_through() {
        let url = playlist_url("https://www.youtube.com/playlist?list=PL1").unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/playlist?list=PL1");
    }

    #[test]
    fn test_playlist_url_rejects_garbage() {
        assert!(matches!(
            playlist_url("not a playlist"),
            Err(FetchError::InvalidPlaylistId(_))
        ));
        assert!(matches!(
            playlist_url("  "),
            Err(FetchError::InvalidPlaylistId(_))
        ));
    }

    #[test]
    fn test_video_url() {
        assert_eq!(
            video_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_parse_output_empty() {
        let result: Result<VideoMetadata, _> = parse_output("  \n");
        assert!(matches!(result, Err(FetchError::EmptyOutput)));
    }

    #[test]
    fn test_parse_output_invalid_json() {
        let result: Result<VideoMetadata, _> = parse_output("ERROR: something broke");
        match result {
            Err(FetchError::InvalidJson { preview, .. }) => {
                assert_eq!(preview, "ERROR: something broke")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_output_metadata() {
        let metadata: VideoMetadata =
            parse_output(r#"{"id": "abc", "upload_date": "20240131", "duration": 61}"#).unwrap();
        assert_eq!(metadata.duration_secs(), Some(61));
    }
}
