use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use url::Url;

use super::error::NotionError;
use super::{api_url, error_for_status, post};
use crate::config::PropertyNames;
use crate::ports::notion::{RowIcon, RowPayload};

/// Notion caps a single rich text object at 2000 characters, counted in UTF-16 code units.
const MAX_TEXT_LEN: usize = 2000;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPage {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

fn truncate_utf16(content: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (index, ch) in content.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return &content[..index];
        }
    }
    content
}

fn text(content: &str) -> Value {
    let content = truncate_utf16(content, MAX_TEXT_LEN);
    json!([{ "text": { "content": content } }])
}

fn date(date: chrono::NaiveDate) -> Value {
    json!({ "date": { "start": date.format("%Y-%m-%d").to_string() } })
}

/// Builds the `properties` object for a new row.
///
/// Optional values are left out entirely rather than sent as null.
pub fn page_properties(row: &RowPayload, names: &PropertyNames) -> Value {
    let mut properties = Map::new();
    properties.insert(names.title.clone(), json!({ "title": text(&row.title) }));
    properties.insert(
        names.priority.clone(),
        json!({ "select": { "name": row.priority } }),
    );
    properties.insert(
        names.topics.clone(),
        json!({
            "multi_select": row
                .topics
                .iter()
                .map(|topic| json!({ "name": topic }))
                .collect::<Vec<_>>()
        }),
    );
    properties.insert(
        names.playlist_name.clone(),
        json!({ "rich_text": text(&row.playlist_name) }),
    );
    properties.insert(
        names.status.clone(),
        json!({ "select": { "name": row.status.as_str() } }),
    );
    properties.insert(names.url.clone(), json!({ "url": row.url }));
    properties.insert(names.date_added.clone(), date(row.date_added));
    if let Some(upload_date) = row.upload_date {
        properties.insert(names.upload_date.clone(), date(upload_date));
    }
    if let Some(length) = row.length_secs {
        properties.insert(names.length.clone(), json!({ "number": length }));
    }
    Value::Object(properties)
}

pub fn page_icon(icon: &RowIcon) -> Value {
    match icon {
        RowIcon::Emoji(emoji) => json!({ "type": "emoji", "emoji": emoji }),
        RowIcon::External(url) => json!({ "type": "external", "external": { "url": url } }),
    }
}

pub fn create_page_body(database_id: &str, row: &RowPayload, names: &PropertyNames) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "icon": page_icon(&row.icon),
        "properties": page_properties(row, names),
    })
}

/// Create a row in a database.
///
/// Endpoint
/// - `POST /v1/pages`
pub async fn create_page(
    client: &Client,
    base_url: &Url,
    token: &str,
    database_id: &str,
    row: &RowPayload,
    names: &PropertyNames,
) -> Result<CreatedPage, NotionError> {
    let url = api_url(base_url, "pages")?;

    let response = post(client, token, url)
        .json(&create_page_body(database_id, row, names))
        .send()
        .await?;

    error_for_status(response)
        .await?
        .json::<CreatedPage>()
        .await
        .map_err(NotionError::Decode)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ports::notion::{PLAY_ICON_URL, PRIVATE_ICON_EMOJI, RowStatus};

    fn sample_row() -> RowPayload {
        RowPayload {
            title: "Intro to Ownership".into(),
            priority: "High".into(),
            topics: vec!["Rust".into(), "Talks".into()],
            playlist_name: "Rust Talks".into(),
            status: RowStatus::ToWatch,
            url: "https://www.youtube.com/watch?v=aaa".into(),
            date_added: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            upload_date: NaiveDate::from_ymd_opt(2023, 1, 2),
            length_secs: Some(754),
            icon: RowIcon::External(PLAY_ICON_URL.into()),
        }
    }

    #[test]
    fn test_page_properties() {
        let properties = page_properties(&sample_row(), &PropertyNames::default());

        assert_eq!(
            properties["Name"]["title"][0]["text"]["content"],
            "Intro to Ownership"
        );
        assert_eq!(properties["Priority"]["select"]["name"], "High");
        assert_eq!(properties["Topic"]["multi_select"][0]["name"], "Rust");
        assert_eq!(properties["Topic"]["multi_select"][1]["name"], "Talks");
        assert_eq!(
            properties["Playlist Name"]["rich_text"][0]["text"]["content"],
            "Rust Talks"
        );
        assert_eq!(properties["Status"]["select"]["name"], "To Watch");
        assert_eq!(
            properties["URL"]["url"],
            "https://www.youtube.com/watch?v=aaa"
        );
        assert_eq!(properties["Date Added"]["date"]["start"], "2026-10-19");
        assert_eq!(properties["OG ADDED"]["date"]["start"], "2023-01-02");
        assert_eq!(properties["Length Sec"]["number"], 754);
    }

    #[test]
    fn test_optional_properties_are_omitted() {
        let row = RowPayload {
            upload_date: None,
            length_secs: None,
            topics: vec![],
            status: RowStatus::OnHold,
            ..sample_row()
        };
        let properties = page_properties(&row, &PropertyNames::default());

        assert!(properties.get("OG ADDED").is_none());
        assert!(properties.get("Length Sec").is_none());
        assert_eq!(properties["Topic"]["multi_select"], json!([]));
        assert_eq!(properties["Status"]["select"]["name"], "On Hold");
    }

    #[test]
    fn test_custom_property_names() {
        let names = PropertyNames {
            url: "Link".into(),
            title: "Title".into(),
            ..PropertyNames::default()
        };
        let properties = page_properties(&sample_row(), &names);
        assert!(properties.get("URL").is_none());
        assert_eq!(properties["Link"]["url"], "https://www.youtube.com/watch?v=aaa");
        assert_eq!(
            properties["Title"]["title"][0]["text"]["content"],
            "Intro to Ownership"
        );
    }

    #[test]
    fn test_long_titles_are_truncated() {
        let row = RowPayload {
            title: "x".repeat(2500),
            ..sample_row()
        };
        let properties = page_properties(&row, &PropertyNames::default());
        let content = properties["Name"]["title"][0]["text"]["content"]
            .as_str()
            .unwrap();
        assert_eq!(content.len(), 2000);
    }

    #[test]
    fn test_truncation_counts_utf16_units() {
        // Each emoji is a surrogate pair in UTF-16.
        let row = RowPayload {
            title: "😀".repeat(1500),
            ..sample_row()
        };
        let properties = page_properties(&row, &PropertyNames::default());
        let content = properties["Name"]["title"][0]["text"]["content"]
            .as_str()
            .unwrap();
        assert_eq!(content.encode_utf16().count(), 2000);
        assert_eq!(content.chars().count(), 1000);

        // A pair is never split at the boundary.
        let odd = format!("{}{}", "a".repeat(1999), "😀");
        assert_eq!(truncate_utf16(&odd, 2000), "a".repeat(1999));
        assert_eq!(truncate_utf16("short", 2000), "short");
    }

    #[test]
    fn test_create_page_body() {
        let body = create_page_body("db-1", &sample_row(), &PropertyNames::default());
        assert_eq!(body["parent"]["database_id"], "db-1");
        assert_eq!(body["icon"]["type"], "external");
        assert_eq!(body["icon"]["external"]["url"], PLAY_ICON_URL);

        let private = RowPayload {
            icon: RowIcon::Emoji(PRIVATE_ICON_EMOJI.into()),
            ..sample_row()
        };
        let body = create_page_body("db-1", &private, &PropertyNames::default());
        assert_eq!(body["icon"]["type"], "emoji");
        assert_eq!(body["icon"]["emoji"], PRIVATE_ICON_EMOJI);
    }
}
