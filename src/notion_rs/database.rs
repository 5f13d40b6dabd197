use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use url::Url;
use serde_json::{Value, json};

use super::error::NotionError;
use super::{api_url, error_for_status, post};

/// Maximum page size Notion accepts for database queries.
pub const QUERY_PAGE_SIZE: u32 = 100;

/* ---------- Query response ---------- */

/// One page of `POST /v1/databases/{id}/query`.
///
/// Notes
/// - Follow `next_cursor` while `has_more` is true.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<NotionPage>,

    #[serde(default)]
    pub has_more: bool,

    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A database row. Property values are kept as raw JSON since only the url is read.
#[derive(Debug, Deserialize)]
pub struct NotionPage {
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

impl NotionPage {
    pub fn url_property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)?
            .get("url")?
            .as_str()
            .filter(|url| !url.is_empty())
    }
}

pub fn query_body(url_property: &str, start_cursor: Option<&str>) -> Value {
    let mut body = json!({
        "page_size": QUERY_PAGE_SIZE,
        "filter": {
            "property": url_property,
            "url": { "is_not_empty": true }
        }
    });
    if let Some(cursor) = start_cursor {
        body["start_cursor"] = json!(cursor);
    }
    body
}

/// Fetch one page of rows that have a url set.
///
/// Endpoint
/// - `POST /v1/databases/{database_id}/query`
pub async fn query_database(
    client: &Client,
    base_url: &Url,
    token: &str,
    database_id: &str,
    url_property: &str,
    start_cursor: Option<&str>,
) -> Result<QueryResponse, NotionError> {
    let url = api_url(base_url, &format!("databases/{}/query", database_id))?;

    let response = post(client, token, url)
        .json(&query_body(url_property, start_cursor))
        .send()
        .await?;

    error_for_status(response)
        .await?
        .json::<QueryResponse>()
        .await
        .map_err(NotionError::Decode)
}
