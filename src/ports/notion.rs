use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;

use crate::notion_rs::error::NotionError;

pub const PLAY_ICON_URL: &str = "https://www.iconsdb.com/icons/preview/black/play-5-xl.png";
pub const PRIVATE_ICON_EMOJI: &str = "🔒";

/// Id of a page created in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowId(pub String);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    ToWatch,
    OnHold,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::ToWatch => "To Watch",
            RowStatus::OnHold => "On Hold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIcon {
    Emoji(String),
    External(String),
}

/// Everything written for one video. Rows are created once and never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPayload {
    pub title: String,
    pub priority: String,
    pub topics: Vec<String>,
    pub playlist_name: String,
    pub status: RowStatus,
    pub url: String,
    pub date_added: NaiveDate,
    pub upload_date: Option<NaiveDate>,
    pub length_secs: Option<u32>,
    pub icon: RowIcon,
}

/// Port trait wrapping the Notion database capabilities used by the sync.
///
/// Implementations live in `services::notion::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RowStore: Send + Sync {
    async fn query_existing_urls(&self, database_id: &str) -> Result<HashSet<String>, NotionError>;

    async fn create_row(&self, database_id: &str, row: &RowPayload) -> Result<RowId, NotionError>;
}
