use chrono::NaiveDate;
use serde::Deserialize;

use super::FetchError;

/* ---------- Flat playlist (`-J --flat-playlist`) ---------- */

/// Top level JSON for a playlist dumped with `--flat-playlist`.
///
/// Notes
/// - Unavailable entries can come back as `null`, hence `Option<FlatEntry>`.
/// - `_type` is `playlist` for playlists; a single video URL yields `video`.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatPlaylist {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(rename = "_type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub entries: Vec<Option<FlatEntry>>,
}

impl FlatPlaylist {
    pub fn display_title(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Unknown Playlist")
            .to_string()
    }

    pub(super) fn ensure_playlist(&self) -> Result<(), FetchError> {
        match self.kind.as_deref() {
            None | Some("playlist") => Ok(()),
            Some(other) => Err(FetchError::NotAPlaylist(other.to_string())),
        }
    }
}

/// One entry of a flat playlist. Only `id` is reliably present.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatEntry {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub duration: Option<f64>,
}

impl FlatEntry {
    /// Private and deleted videos keep their id but lose their real title.
    pub fn is_private(&self) -> bool {
        match self.title.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(title) => {
                title.eq_ignore_ascii_case("[private video]")
                    || title.eq_ignore_ascii_case("[deleted video]")
            }
        }
    }

    pub fn duration_secs(&self) -> Option<u32> {
        self.duration.and_then(whole_seconds)
    }
}

/* ---------- Single video (`-J --skip-download`) ---------- */

#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    /// `YYYYMMDD`
    #[serde(default)]
    pub upload_date: Option<String>,

    #[serde(default)]
    pub duration: Option<f64>,
}

impl VideoMetadata {
    pub fn upload_date(&self) -> Option<NaiveDate> {
        let raw = self.upload_date.as_deref()?;
        match NaiveDate::parse_from_str(raw, "%Y%m%d") {
            Ok(date) => Some(date),
            Err(e) => {
                log::warn!("Ignoring unparseable upload date '{}': {}", raw, e);
                None
            }
        }
    }

    pub fn duration_secs(&self) -> Option<u32> {
        self.duration.and_then(whole_seconds)
    }
}

fn whole_seconds(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 {
        Some(value.trunc() as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT_PLAYLIST: &str = r#"{
        "_type": "playlist",
        "id": "PL123",
        "title": "Rust Talks",
        "entries": [
            {"_type": "url", "id": "aaa", "title": "Intro to Ownership", "duration": 754.0},
            {"_type": "url", "id": "bbb", "title": "[Private video]", "duration": null},
            null,
            {"_type": "url", "id": "ccc", "title": "Async in Depth"}
        ]
    }"#;

    #[test]
    fn test_deserialize_flat_playlist() {
        let playlist: FlatPlaylist = serde_json::from_str(FLAT_PLAYLIST).unwrap();
        assert_eq!(playlist.display_title(), "Rust Talks");
        assert_eq!(playlist.entries.len(), 4);
        assert!(playlist.entries[2].is_none());
        assert!(playlist.ensure_playlist().is_ok());

        let first = playlist.entries[0].as_ref().unwrap();
        assert!(!first.is_private());
        assert_eq!(first.duration_secs(), Some(754));

        let second = playlist.entries[1].as_ref().unwrap();
        assert!(second.is_private());
        assert_eq!(second.duration_secs(), None);
    }

    #[test]
    fn test_missing_title_defaults() {
        let playlist: FlatPlaylist = serde_json::from_str(r#"{"entries": []}"#).unwrap();
        assert_eq!(playlist.display_title(), "Unknown Playlist");
        assert!(playlist.entries.is_empty());
    }

    #[test]
    fn test_single_video_is_not_a_playlist() {
        let playlist: FlatPlaylist =
            serde_json::from_str(r#"{"_type": "video", "id": "x", "title": "Just one"}"#).unwrap();
        assert!(matches!(
            playlist.ensure_playlist(),
            Err(FetchError::NotAPlaylist(kind)) if kind == "video"
        ));
    }

    #[test]
    fn test_private_detection() {
        let entry = |title: Option<&str>| FlatEntry {
            id: Some("x".into()),
            title: title.map(String::from),
            duration: None,
        };
        assert!(entry(None).is_private());
        assert!(entry(Some("  ")).is_private());
        assert!(entry(Some("[PRIVATE VIDEO]")).is_private());
        assert!(entry(Some("[Deleted video]")).is_private());
        assert!(!entry(Some("Private video tour")).is_private());
    }

    #[test]
    fn test_metadata_parsing() {
        let metadata = VideoMetadata {
            upload_date: Some("20231105".into()),
            duration: Some(3599.9),
        };
        assert_eq!(
            metadata.upload_date(),
            NaiveDate::from_ymd_opt(2023, 11, 5)
        );
        assert_eq!(metadata.duration_secs(), Some(3599));
    }

    #[test]
    fn test_metadata_bad_values() {
        let metadata = VideoMetadata {
            upload_date: Some("2023-11-05".into()),
            duration: Some(-1.0),
        };
        assert_eq!(metadata.upload_date(), None);
        assert_eq!(metadata.duration_secs(), None);

        let metadata = VideoMetadata {
            upload_date: None,
            duration: Some(f64::NAN),
        };
        assert_eq!(metadata.upload_date(), None);
        assert_eq!(metadata.duration_secs(), None);
    }
}
