use std::time::Duration;

use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response};
use url::Url;

pub mod database;
pub mod error;
pub mod pages;

use error::NotionError;

/// Docs:
/// https://developers.notion.com/reference/versioning
pub const NOTION_VERSION: &str = "2022-06-28";
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1/";

/// `base_url` must end with a slash, otherwise its last segment is replaced.
pub(crate) fn api_url(base_url: &Url, path: &str) -> Result<Url, NotionError> {
    base_url
        .join(path)
        .map_err(|e| NotionError::Validation(format!("Invalid Notion API path '{}': {}", path, e)))
}

/// POST with the auth and version headers every Notion call needs.
pub(crate) fn post(client: &Client, token: &str, url: Url) -> RequestBuilder {
    client
        .post(url)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .header("Notion-Version", NOTION_VERSION)
}

/// Turns non-2xx responses into a classified `NotionError`.
pub(crate) async fn error_for_status(response: Response) -> Result<Response, NotionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error text".to_string());

    Err(NotionError::from_status(status, retry_after, &body))
}
