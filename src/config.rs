use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIORITY: &str = "Medium";
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// Column names of the target Notion database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    pub title: String,
    pub priority: String,
    pub topics: String,
    pub playlist_name: String,
    pub status: String,
    pub url: String,
    pub date_added: String,
    pub upload_date: String,
    pub length: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            title: "Name".to_string(),
            priority: "Priority".to_string(),
            topics: "Topic".to_string(),
            playlist_name: "Playlist Name".to_string(),
            status: "Status".to_string(),
            url: "URL".to_string(),
            date_added: "Date Added".to_string(),
            upload_date: "OG ADDED".to_string(),
            length: "Length Sec".to_string(),
        }
    }
}

/// Optional TOML file. Everything in it has a default, so a missing file is fine.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub properties: PropertyNames,
}

impl FileConfig {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: FileConfig = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-notion-sync").join("config.toml"))
    }

    /// Load the default config file if there is one
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set and non-empty")]
    Missing(&'static str),
}

/// Settings for one run. Built once at startup and passed down by reference.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub notion_token: String,
    pub database_id: String,
    pub playlist_id: String,
    pub priority: String,
    pub topics: Vec<String>,
    pub max_retries: usize,
    pub properties: PropertyNames,
}

fn required(value: String, name: &'static str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Missing(name));
    }
    Ok(value.to_string())
}

impl SyncConfig {
    pub fn new(
        notion_token: String,
        database_id: String,
        playlist_id: String,
        priority: Option<String>,
        topic_list: Option<String>,
        max_retries: usize,
        properties: PropertyNames,
    ) -> Result<Self, ConfigError> {
        let priority = priority
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PRIORITY.to_string());

        Ok(Self {
            notion_token: required(notion_token, "NOTION_TOKEN")?,
            database_id: required(database_id, "DATABASE_ID")?,
            playlist_id: required(playlist_id, "PLAYLIST_ID")?,
            priority,
            topics: topic_list.as_deref().map(parse_topics).unwrap_or_default(),
            max_retries,
            properties,
        })
    }
}

/// Splits a comma separated topic list. Blank items are dropped and repeats collapsed.
pub fn parse_topics(raw: &str) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for topic in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !topics.iter().any(|t| t == topic) {
            topics.push(topic.to_string());
        }
    }
    topics
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn build(priority: Option<&str>, topics: Option<&str>) -> Result<SyncConfig, ConfigError> {
        SyncConfig::new(
            "secret_token".into(),
            "db-123".into(),
            "PL123".into(),
            priority.map(String::from),
            topics.map(String::from),
            DEFAULT_MAX_RETRIES,
            PropertyNames::default(),
        )
    }

    #[test]
    fn test_parse_topics() {
        assert_eq!(
            parse_topics(" Rust, Systems ,,Rust,  Talks "),
            vec!["Rust", "Systems", "Talks"]
        );
        assert!(parse_topics("").is_empty());
        assert!(parse_topics(" , ,").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = build(None, None).unwrap();
        assert_eq!(config.priority, DEFAULT_PRIORITY);
        assert!(config.topics.is_empty());

        let config = build(Some("  "), Some("")).unwrap();
        assert_eq!(config.priority, DEFAULT_PRIORITY);
        assert!(config.topics.is_empty());
    }

    #[test]
    fn test_explicit_values() {
        let config = build(Some("High"), Some("Rust,Async")).unwrap();
        assert_eq!(config.priority, "High");
        assert_eq!(config.topics, vec!["Rust", "Async"]);
        assert_eq!(config.playlist_id, "PL123");
    }

    #[test]
    fn test_blank_required_values_are_rejected() {
        let result = SyncConfig::new(
            "token".into(),
            "   ".into(),
            "PL123".into(),
            None,
            None,
            DEFAULT_MAX_RETRIES,
            PropertyNames::default(),
        );
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_ID"))));

        let result = SyncConfig::new(
            "".into(),
            "db".into(),
            "PL123".into(),
            None,
            None,
            DEFAULT_MAX_RETRIES,
            PropertyNames::default(),
        );
        assert!(matches!(result, Err(ConfigError::Missing("NOTION_TOKEN"))));
    }

    #[test]
    fn test_file_config_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[properties]\nurl = \"Link\"\nlength = \"Seconds\"").unwrap();

        let config = FileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.properties.url, "Link");
        assert_eq!(config.properties.length, "Seconds");
        assert_eq!(config.properties.title, "Name");
        assert_eq!(config.properties.upload_date, "OG ADDED");
    }

    #[test]
    fn test_file_config_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[properties\nurl = ").unwrap();
        assert!(FileConfig::from_file(file.path()).is_err());
    }
}
